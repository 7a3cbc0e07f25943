use crate::derle::{decode_segment, SegmentStatus};
use crate::error::{CodecError, Result};
use crate::geometry::{ImageGeometry, RleParameters};
use crate::header::RleHeader;
use crate::mapper::PlaneMapper;
use crate::pixel_data::{FragmentSource, FrameSource};
use crate::rle::SegmentEncoder;
use crate::HEADER_LEN;
use std::borrow::Cow;

/// RLE Lossless codec bound to one image geometry.
///
/// Every frame is coded on its own; nothing is carried from one frame to the
/// next, so callers are free to spread frames over threads.
#[derive(Debug, Clone)]
pub struct RleCodec {
    geometry: ImageGeometry,
    params: RleParameters,
    mapper: PlaneMapper,
}

impl RleCodec {
    pub const NAME: &'static str = "RLE Lossless";

    pub fn new(geometry: ImageGeometry, params: RleParameters) -> Result<Self> {
        let mapper = PlaneMapper::new(&geometry, &params)?;
        debug!("{} codec for {:?}, {:?}", Self::NAME, geometry, params);
        Ok(RleCodec {
            geometry,
            params,
            mapper,
        })
    }

    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    pub fn params(&self) -> &RleParameters {
        &self.params
    }

    /// Compresses one uncompressed frame into header + segments.
    pub fn encode_frame(&self, frame: &[u8]) -> Result<Vec<u8>> {
        let segment_count = self.mapper.segment_count();
        let mut header = RleHeader {
            segment_count: segment_count as u32,
            ..Default::default()
        };
        let mut out = Vec::with_capacity(HEADER_LEN + frame.len() / 2);
        out.resize(HEADER_LEN, 0);

        for segment in 0..segment_count {
            let plane = self.mapper.gather(segment, frame)?;
            // segments start on even offsets
            if out.len() % 2 == 1 {
                out.push(0);
            }
            let start = out.len();
            header.offsets[segment] = u32::try_from(start).map_err(|_| {
                CodecError::InvalidGeometry("compressed frame exceeds 4 GiB".into())
            })?;
            let mut encoder = SegmentEncoder::new(&mut out);
            for byte in plane {
                encoder.update(byte)?;
            }
            encoder.finalize()?;
            debug!(
                "segment {segment}: {} bytes at offset {start}",
                out.len() - start
            );
        }

        if out.len() % 2 == 1 {
            out.push(0);
        }
        out[..HEADER_LEN].copy_from_slice(&header.to_bytes());
        debug!(
            "encoded {} byte frame into {} bytes",
            frame.len(),
            out.len()
        );
        Ok(out)
    }

    /// Decompresses one frame given as fragments that concatenate to the
    /// compressed buffer.
    pub fn decode_fragments(&self, fragments: &[&[u8]]) -> Result<Vec<u8>> {
        let data: Cow<[u8]> = match fragments {
            [] => return Err(CodecError::NoFragments),
            [single] => Cow::Borrowed(*single),
            many => Cow::Owned(many.concat()),
        };
        self.decode_frame(&data)
    }

    /// Decompresses one frame from a single contiguous buffer.
    pub fn decode_frame(&self, data: &[u8]) -> Result<Vec<u8>> {
        let header = RleHeader::parse(data)?;
        let expected = self.mapper.segment_count();
        if header.segment_count() != expected {
            error!(
                "unexpected number of RLE segments: expected {expected}, found {}",
                header.segment_count()
            );
            return Err(CodecError::SegmentCountMismatch {
                expected,
                found: header.segment_count(),
            });
        }

        let pixel_count = self.mapper.pixel_count();
        let mut frame = vec![0u8; self.geometry.frame_len()?];
        let mut plane = vec![0u8; pixel_count];
        for segment in 0..expected {
            let range = header.segment_range(segment, data.len())?;
            plane.fill(0);
            match decode_segment(&data[range], &mut plane) {
                SegmentStatus::Complete(n) if n == pixel_count => {}
                SegmentStatus::Complete(n) => {
                    warn!("segment {segment} decoded to {n} of {pixel_count} bytes")
                }
                status => warn!("segment {segment} is damaged: {status:?}"),
            }
            self.mapper.scatter(segment, &plane, &mut frame)?;
        }
        Ok(frame)
    }

    /// Compresses every frame of `frames`, one buffer per frame.
    pub fn encode<S: FrameSource + ?Sized>(&self, frames: &S) -> Result<Vec<Vec<u8>>> {
        let count = frames.frame_count();
        (0..count)
            .map(|index| {
                let frame = frames
                    .frame(index)
                    .ok_or(CodecError::FrameOutOfRange { index, count })?;
                debug!("encoding frame {index} of {count}");
                self.encode_frame(frame)
            })
            .collect()
    }

    /// Decompresses every frame of `frames`.
    pub fn decode<S: FragmentSource + ?Sized>(&self, frames: &S) -> Result<Vec<Vec<u8>>> {
        (0..frames.frame_count())
            .map(|index| self.decode_single_frame(index, frames))
            .collect()
    }

    /// Decompresses frame `index` only.
    pub fn decode_single_frame<S: FragmentSource + ?Sized>(
        &self,
        index: usize,
        frames: &S,
    ) -> Result<Vec<u8>> {
        let count = frames.frame_count();
        let fragments = frames
            .fragments(index)
            .ok_or(CodecError::FrameOutOfRange { index, count })?;
        debug!(
            "decoding frame {index} of {count} from {} fragments",
            fragments.len()
        );
        self.decode_fragments(&fragments)
    }
}
