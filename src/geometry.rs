use crate::error::{CodecError, Result};
use crate::MAX_SEGMENTS;

/// How the samples of a pixel are laid out in the uncompressed frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlanarConfiguration {
    /// `RGBRGBRGB...`
    Interleaved,
    /// `RRR...GGG...BBB...`
    Planar,
}

impl TryFrom<u16> for PlanarConfiguration {
    type Error = CodecError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0 => Ok(PlanarConfiguration::Interleaved),
            1 => Ok(PlanarConfiguration::Planar),
            other => Err(CodecError::InvalidGeometry(format!(
                "planar configuration must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// Dimensions and sample layout of one uncompressed frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
    pub bytes_allocated: u8,
    pub samples_per_pixel: u8,
    pub planar_configuration: PlanarConfiguration,
}

impl ImageGeometry {
    pub fn new(
        width: u32,
        height: u32,
        bytes_allocated: u8,
        samples_per_pixel: u8,
        planar_configuration: PlanarConfiguration,
    ) -> Self {
        ImageGeometry {
            width,
            height,
            bytes_allocated,
            samples_per_pixel,
            planar_configuration,
        }
    }

    /// Single sample, interleaved.
    pub fn grayscale(width: u32, height: u32, bytes_allocated: u8) -> Self {
        Self::new(
            width,
            height,
            bytes_allocated,
            1,
            PlanarConfiguration::Interleaved,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CodecError::InvalidGeometry(format!(
                "dimensions {}x{}",
                self.width, self.height
            )));
        }
        if self.bytes_allocated == 0 {
            return Err(CodecError::InvalidGeometry(
                "bytes allocated must be at least 1".into(),
            ));
        }
        if self.samples_per_pixel == 0 {
            return Err(CodecError::InvalidGeometry(
                "samples per pixel must be at least 1".into(),
            ));
        }
        let segments = self.segment_count();
        if segments > MAX_SEGMENTS {
            return Err(CodecError::TooManySegments(segments));
        }
        // make sure the frame size is addressable
        self.frame_len()?;
        Ok(())
    }

    pub fn pixel_count(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or_else(|| {
                CodecError::InvalidGeometry(format!(
                    "{}x{} overflows usize",
                    self.width, self.height
                ))
            })
    }

    /// One segment per byte of every sample.
    pub fn segment_count(&self) -> usize {
        self.bytes_allocated as usize * self.samples_per_pixel as usize
    }

    /// Size in bytes of one uncompressed frame.
    pub fn frame_len(&self) -> Result<usize> {
        self.pixel_count()?
            .checked_mul(self.segment_count())
            .ok_or_else(|| CodecError::InvalidGeometry("frame size overflows usize".into()))
    }
}

/// Options of the RLE codec.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RleParameters {
    /// `false`: the most significant byte of each sample goes to the first
    /// segment while reading samples stored little-endian. `true`: segment
    /// `k` takes intra-sample byte `k` as stored.
    pub reverse_byte_order: bool,
    /// Palette colour is expanded by the caller before encoding; carried
    /// here so callers can keep one parameter set per transfer.
    pub convert_palette_to_rgb: bool,
}

impl RleParameters {
    pub fn new(reverse_byte_order: bool) -> Self {
        RleParameters {
            reverse_byte_order,
            convert_palette_to_rgb: false,
        }
    }
}

impl Default for RleParameters {
    /// Samples are assumed to be stored in host byte order.
    fn default() -> Self {
        Self::new(cfg!(target_endian = "big"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_sizes() {
        let geometry = ImageGeometry::new(4, 3, 2, 3, PlanarConfiguration::Planar);
        assert_eq!(geometry.pixel_count().unwrap(), 12);
        assert_eq!(geometry.segment_count(), 6);
        assert_eq!(geometry.frame_len().unwrap(), 72);
        geometry.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let zero = ImageGeometry::grayscale(0, 8, 1);
        assert!(matches!(
            zero.validate(),
            Err(CodecError::InvalidGeometry(_))
        ));

        let no_bytes = ImageGeometry::grayscale(8, 8, 0);
        assert!(matches!(
            no_bytes.validate(),
            Err(CodecError::InvalidGeometry(_))
        ));

        let wide = ImageGeometry::new(8, 8, 4, 4, PlanarConfiguration::Interleaved);
        assert!(matches!(
            wide.validate(),
            Err(CodecError::TooManySegments(16))
        ));
    }

    #[test]
    fn test_planar_configuration_from_attribute() {
        assert_eq!(
            PlanarConfiguration::try_from(0u16).unwrap(),
            PlanarConfiguration::Interleaved
        );
        assert_eq!(
            PlanarConfiguration::try_from(1u16).unwrap(),
            PlanarConfiguration::Planar
        );
        assert!(PlanarConfiguration::try_from(2u16).is_err());
    }

    #[test]
    fn test_default_follows_host_endianness() {
        let params = RleParameters::default();
        assert_eq!(params.reverse_byte_order, cfg!(target_endian = "big"));
        assert!(!params.convert_palette_to_rgb);
    }
}
