//! Frame containers the codec reads from.
//!
//! The pixel data model itself lives with the caller; these traits are the
//! only view the codec needs of it.

use crate::error::{CodecError, Result};
use crate::geometry::ImageGeometry;

/// Uncompressed frames, one flat buffer each.
pub trait FrameSource {
    fn frame_count(&self) -> usize;
    fn frame(&self, index: usize) -> Option<&[u8]>;
}

/// Compressed frames, each split into one or more fragments.
pub trait FragmentSource {
    fn frame_count(&self) -> usize;
    fn fragments(&self, index: usize) -> Option<Vec<&[u8]>>;
}

impl<T: AsRef<[u8]>> FrameSource for [T] {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn frame(&self, index: usize) -> Option<&[u8]> {
        self.get(index).map(AsRef::as_ref)
    }
}

impl<T: AsRef<[u8]>> FrameSource for Vec<T> {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn frame(&self, index: usize) -> Option<&[u8]> {
        self.as_slice().frame(index)
    }
}

impl<T: AsRef<[u8]>> FragmentSource for [Vec<T>] {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn fragments(&self, index: usize) -> Option<Vec<&[u8]>> {
        self.get(index)
            .map(|fragments| fragments.iter().map(AsRef::as_ref).collect())
    }
}

impl<T: AsRef<[u8]>> FragmentSource for Vec<Vec<T>> {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn fragments(&self, index: usize) -> Option<Vec<&[u8]>> {
        self.as_slice().fragments(index)
    }
}

/// Native pixel data: every frame stored back to back in one buffer.
#[derive(Debug, Clone, Copy)]
pub struct MultiFrame<'a> {
    data: &'a [u8],
    frame_len: usize,
}

impl<'a> MultiFrame<'a> {
    pub fn new(data: &'a [u8], geometry: &ImageGeometry) -> Result<Self> {
        geometry.validate()?;
        let frame_len = geometry.frame_len()?;
        if data.len() % frame_len != 0 {
            return Err(CodecError::InvalidGeometry(format!(
                "{} bytes of pixel data is not a whole number of {frame_len} byte frames",
                data.len()
            )));
        }
        Ok(MultiFrame { data, frame_len })
    }
}

impl FrameSource for MultiFrame<'_> {
    fn frame_count(&self) -> usize {
        self.data.len() / self.frame_len
    }

    fn frame(&self, index: usize) -> Option<&[u8]> {
        self.data.chunks_exact(self.frame_len).nth(index)
    }
}
