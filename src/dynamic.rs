//! Encoding `image` buffers as single RLE frames.
//!
//! 16 bit samples are laid out in host byte order, which is what
//! [`RleParameters::default`] expects.

use crate::codec::RleCodec;
use crate::error::{CodecError, Result};
use crate::geometry::{ImageGeometry, PlanarConfiguration, RleParameters};
use image::{DynamicImage, ImageBuffer, Luma, Pixel, Rgb};
use std::borrow::Cow;

/// Geometry of an 8 or 16 bit grayscale or RGB image.
pub fn geometry_of(image: &DynamicImage) -> Result<ImageGeometry> {
    let (bytes_allocated, samples_per_pixel) = match image {
        DynamicImage::ImageLuma8(_) => (1, 1),
        DynamicImage::ImageLuma16(_) => (2, 1),
        DynamicImage::ImageRgb8(_) => (1, 3),
        DynamicImage::ImageRgb16(_) => (2, 3),
        other => {
            return Err(CodecError::UnsupportedColorType(format!(
                "{:?}",
                other.color()
            )))
        }
    };
    Ok(ImageGeometry::new(
        image.width(),
        image.height(),
        bytes_allocated,
        samples_per_pixel,
        PlanarConfiguration::Interleaved,
    ))
}

fn native_bytes(image: &DynamicImage) -> Result<Cow<'_, [u8]>> {
    let words = |samples: &[u16]| -> Vec<u8> {
        samples.iter().flat_map(|v| v.to_ne_bytes()).collect()
    };
    match image {
        DynamicImage::ImageLuma8(buf) => Ok(Cow::Borrowed(buf.as_raw().as_slice())),
        DynamicImage::ImageRgb8(buf) => Ok(Cow::Borrowed(buf.as_raw().as_slice())),
        DynamicImage::ImageLuma16(buf) => Ok(Cow::Owned(words(buf.as_raw().as_slice()))),
        DynamicImage::ImageRgb16(buf) => Ok(Cow::Owned(words(buf.as_raw().as_slice()))),
        other => Err(CodecError::UnsupportedColorType(format!(
            "{:?}",
            other.color()
        ))),
    }
}

/// Compresses `image` into one RLE frame.
pub fn encode_image(image: &DynamicImage) -> Result<Vec<u8>> {
    let codec = RleCodec::new(geometry_of(image)?, RleParameters::default())?;
    codec.encode_frame(&native_bytes(image)?)
}

fn from_raw<P>(
    geometry: &ImageGeometry,
    samples: Vec<P::Subpixel>,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel,
{
    ImageBuffer::from_raw(geometry.width, geometry.height, samples).ok_or_else(|| {
        CodecError::InvalidGeometry(format!(
            "decoded frame does not fill a {}x{} image",
            geometry.width, geometry.height
        ))
    })
}

/// Decompresses a frame produced by [`encode_image`] (or any interleaved
/// 8/16 bit grayscale or RGB frame).
pub fn decode_image(fragments: &[&[u8]], geometry: &ImageGeometry) -> Result<DynamicImage> {
    if geometry.planar_configuration != PlanarConfiguration::Interleaved {
        return Err(CodecError::UnsupportedColorType(
            "planar frames have no image buffer layout".into(),
        ));
    }
    let codec = RleCodec::new(*geometry, RleParameters::default())?;
    let frame = codec.decode_fragments(fragments)?;
    let words = |bytes: &[u8]| -> Vec<u16> {
        bytes
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect()
    };
    let image = match (geometry.bytes_allocated, geometry.samples_per_pixel) {
        (1, 1) => DynamicImage::ImageLuma8(from_raw::<Luma<u8>>(geometry, frame)?),
        (2, 1) => DynamicImage::ImageLuma16(from_raw::<Luma<u16>>(geometry, words(&frame))?),
        (1, 3) => DynamicImage::ImageRgb8(from_raw::<Rgb<u8>>(geometry, frame)?),
        (2, 3) => DynamicImage::ImageRgb16(from_raw::<Rgb<u16>>(geometry, words(&frame))?),
        (bytes, samples) => {
            return Err(CodecError::UnsupportedColorType(format!(
                "{bytes} bytes x {samples} samples"
            )))
        }
    };
    Ok(image)
}
