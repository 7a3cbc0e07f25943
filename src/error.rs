use std::io;
use thiserror::Error;

/// Errors that abort encoding or decoding of a frame.
///
/// Damaged run data inside a segment is not reported here: the segment
/// decoder stops early and reports a [`SegmentStatus`](crate::SegmentStatus)
/// instead.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("{0} segments requested, the header holds at most 15")]
    TooManySegments(usize),
    #[error("byte offset {offset} is outside a frame buffer of {len} bytes")]
    AddressOutOfRange { offset: usize, len: usize },
    #[error("compressed frame of {0} bytes is too short for the 64 byte header")]
    TruncatedHeader(usize),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("unexpected number of segments: expected {expected}, found {found}")]
    SegmentCountMismatch { expected: usize, found: usize },
    #[error("segment {segment} requested, header declares {count}")]
    SegmentOutOfRange { segment: usize, count: usize },
    #[error("segment {segment} has invalid offset {offset}")]
    InvalidSegmentOffset { segment: usize, offset: u32 },
    #[error("frame {index} requested, stream holds {count} frames")]
    FrameOutOfRange { index: usize, count: usize },
    #[error("no fragments supplied for the compressed frame")]
    NoFragments,
    #[error("unsupported color type: {0}")]
    UnsupportedColorType(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
