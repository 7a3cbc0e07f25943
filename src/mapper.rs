//! Addressing between segments and the uncompressed frame.
//!
//! Segment `s` of a frame holds intra-sample byte `s % bytes_allocated` of
//! sample `s / bytes_allocated` for every pixel, in pixel order:
//!
//! ```text
//! 16 bit RGB, interleaved, reverse_byte_order = false (little-endian storage)
//!
//!   frame:   R.lo R.hi G.lo G.hi B.lo B.hi | R.lo R.hi ...
//!   segment:  1    0    3    2    5    4   |  1    0   ...
//! ```

use crate::error::{CodecError, Result};
use crate::geometry::{ImageGeometry, PlanarConfiguration, RleParameters};

/// Maps (sample, intra-sample byte, pixel) to offsets in the frame buffer.
#[derive(Debug, Copy, Clone)]
pub struct PlaneMapper {
    bytes_allocated: usize,
    samples_per_pixel: usize,
    pixel_count: usize,
    planar_configuration: PlanarConfiguration,
    reverse_byte_order: bool,
}

/// Every offset of one segment's byte plane.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Plane {
    pub start: usize,
    pub step: usize,
    pub count: usize,
}

impl Plane {
    pub fn offsets(&self) -> impl Iterator<Item = usize> {
        let Plane { start, step, count } = *self;
        (0..count).map(move |pixel| start + pixel * step)
    }
}

impl PlaneMapper {
    pub fn new(geometry: &ImageGeometry, params: &RleParameters) -> Result<Self> {
        geometry.validate()?;
        Ok(PlaneMapper {
            bytes_allocated: geometry.bytes_allocated as usize,
            samples_per_pixel: geometry.samples_per_pixel as usize,
            pixel_count: geometry.pixel_count()?,
            planar_configuration: geometry.planar_configuration,
            reverse_byte_order: params.reverse_byte_order,
        })
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.bytes_allocated * self.samples_per_pixel
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Intra-sample byte carried by the `k`-th segment of a sample.
    #[inline]
    pub fn intra_byte_index(&self, k: usize) -> usize {
        if self.reverse_byte_order {
            k
        } else {
            self.bytes_allocated - k - 1
        }
    }

    /// Distance between two successive pixels of the same plane.
    #[inline]
    pub fn offset_step(&self) -> usize {
        match self.planar_configuration {
            PlanarConfiguration::Interleaved => self.bytes_allocated * self.samples_per_pixel,
            PlanarConfiguration::Planar => self.bytes_allocated,
        }
    }

    /// `None` when the offset does not fit in `usize`.
    pub fn byte_offset(&self, sample: usize, intra_byte: usize, pixel: usize) -> Option<usize> {
        let base = match self.planar_configuration {
            PlanarConfiguration::Interleaved => sample.checked_mul(self.bytes_allocated)?,
            PlanarConfiguration::Planar => sample
                .checked_mul(self.bytes_allocated)?
                .checked_mul(self.pixel_count)?,
        };
        base.checked_add(intra_byte)?
            .checked_add(pixel.checked_mul(self.offset_step())?)
    }

    /// Resolves segment `segment` against a frame buffer of `len` bytes.
    pub fn plane(&self, segment: usize, len: usize) -> Result<Plane> {
        let sample = segment / self.bytes_allocated;
        let intra_byte = self.intra_byte_index(segment % self.bytes_allocated);
        let last_pixel = self.pixel_count.saturating_sub(1);
        let overflow = || CodecError::AddressOutOfRange {
            offset: usize::MAX,
            len,
        };
        let start = self
            .byte_offset(sample, intra_byte, 0)
            .ok_or_else(overflow)?;
        let last = self
            .byte_offset(sample, intra_byte, last_pixel)
            .ok_or_else(overflow)?;
        if segment >= self.segment_count() || last >= len {
            return Err(CodecError::AddressOutOfRange { offset: last, len });
        }
        trace!(
            "segment {segment}: sample {sample}, byte {intra_byte}, start {start}, step {}",
            self.offset_step()
        );
        Ok(Plane {
            start,
            step: self.offset_step(),
            count: self.pixel_count,
        })
    }

    /// Bytes of one segment's plane, read out of `frame` in pixel order.
    pub fn gather<'a>(
        &self,
        segment: usize,
        frame: &'a [u8],
    ) -> Result<impl Iterator<Item = u8> + 'a> {
        let plane = self.plane(segment, frame.len())?;
        Ok(plane.offsets().map(move |offset| frame[offset]))
    }

    /// Writes a decoded plane back into `frame`.
    pub fn scatter(&self, segment: usize, plane_bytes: &[u8], frame: &mut [u8]) -> Result<()> {
        let plane = self.plane(segment, frame.len())?;
        for (offset, byte) in plane.offsets().zip(plane_bytes.iter()) {
            frame[offset] = *byte;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(
        bytes_allocated: u8,
        samples_per_pixel: u8,
        planar: PlanarConfiguration,
        reverse_byte_order: bool,
    ) -> PlaneMapper {
        let geometry = ImageGeometry::new(2, 2, bytes_allocated, samples_per_pixel, planar);
        PlaneMapper::new(&geometry, &RleParameters::new(reverse_byte_order)).unwrap()
    }

    #[test]
    fn test_interleaved_rgb16_offsets() {
        let m = mapper(2, 3, PlanarConfiguration::Interleaved, false);
        assert_eq!(m.segment_count(), 6);
        assert_eq!(m.offset_step(), 6);
        // first segment carries the high byte of red
        assert_eq!(m.plane(0, 24).unwrap().start, 1);
        assert_eq!(m.plane(1, 24).unwrap().start, 0);
        assert_eq!(m.plane(4, 24).unwrap().start, 5);
        let offsets: Vec<usize> = m.plane(2, 24).unwrap().offsets().collect();
        assert_eq!(offsets, vec![3, 9, 15, 21]);
    }

    #[test]
    fn test_reverse_byte_order_keeps_storage_order() {
        let m = mapper(2, 1, PlanarConfiguration::Interleaved, true);
        assert_eq!(m.intra_byte_index(0), 0);
        assert_eq!(m.intra_byte_index(1), 1);
        let offsets: Vec<usize> = m.plane(1, 8).unwrap().offsets().collect();
        assert_eq!(offsets, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_planar_rgb8_offsets() {
        let m = mapper(1, 3, PlanarConfiguration::Planar, false);
        assert_eq!(m.offset_step(), 1);
        assert_eq!(m.byte_offset(2, 0, 0), Some(8));
        let offsets: Vec<usize> = m.plane(1, 12).unwrap().offsets().collect();
        assert_eq!(offsets, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_short_frame_is_out_of_range() {
        let m = mapper(1, 3, PlanarConfiguration::Interleaved, false);
        assert!(matches!(
            m.plane(2, 11),
            Err(CodecError::AddressOutOfRange { offset: 11, len: 11 })
        ));
        assert!(m.plane(3, 12).is_err());
    }

    #[test]
    fn test_gather_then_scatter() {
        let m = mapper(2, 1, PlanarConfiguration::Interleaved, false);
        let frame = [0x01, 0xA0, 0x02, 0xB0, 0x03, 0xC0, 0x04, 0xD0];
        let high: Vec<u8> = m.gather(0, &frame).unwrap().collect();
        let low: Vec<u8> = m.gather(1, &frame).unwrap().collect();
        assert_eq!(high, vec![0xA0, 0xB0, 0xC0, 0xD0]);
        assert_eq!(low, vec![0x01, 0x02, 0x03, 0x04]);

        let mut out = [0u8; 8];
        m.scatter(0, &high, &mut out).unwrap();
        m.scatter(1, &low, &mut out).unwrap();
        assert_eq!(out, frame);
    }
}
