//! # RLE Lossless Frame Layout
//!
//! ```text
//!  0        4        8                    64
//!  │        │        │                     │
//!  ▼        ▼        ▼                     ▼
//! ┌────────┬────────┬────────┬───┬────────┬───────────┬───────────┬───┬────┐
//! │ count  │ off[0] │ off[1] │...│ off[14]│ segment 0 │ segment 1 │...│pad?│
//! └────────┴────────┴────────┴───┴────────┴───────────┴───────────┴───┴────┘
//! ```
//!
//! Sixteen little-endian `u32`: the number of segments followed by fifteen
//! absolute segment offsets, unused slots zeroed. A frame has one segment per
//! byte of every sample, so 16 bit grayscale has two and 8 bit RGB has three.
//! Segments start on even offsets and the frame has even length; the gaps are
//! a single `0x00`.
//!
//! # Segment Encoding Scheme
//!
//! A segment is the PackBits-style compression of one byte plane.
//!
//! ```text
//! 0NNN NNNN  b0 b1 .. bN      literal run, copy N + 1 bytes (1..=128)
//! 1NNN NNNN  b                replicate run, repeat b 257 - N times
//! ```
//!
//! The encoder keeps runs of one or two equal bytes inside literal runs, and
//! never emits a run longer than 128. A lone `0x00` at the very end of a
//! segment is a pad byte.
//!
//! The decoder never trusts the stream: it writes at most one plane, and a
//! run that overshoots the segment or the plane ends decoding of that segment
//! with the bytes decoded so far.

#[macro_use]
extern crate log;

mod codec;
mod derle;
pub mod dynamic;
mod error;
mod geometry;
mod header;
mod mapper;
mod pixel_data;
mod rle;

pub use codec::RleCodec;
pub use derle::{decode_segment, SegmentDecoder, SegmentStatus};
pub use error::{CodecError, Result};
pub use geometry::{ImageGeometry, PlanarConfiguration, RleParameters};
pub use header::RleHeader;
pub use mapper::{Plane, PlaneMapper};
pub use pixel_data::{FragmentSource, FrameSource, MultiFrame};
pub use rle::SegmentEncoder;

/// size of the segment table in front of every frame
pub const HEADER_LEN: usize = 64;
pub const MAX_SEGMENTS: usize = 15;
/// longest literal or replicate run
pub const MAX_RUN: usize = 128;
const LITERAL_BUFFER_LEN: usize = MAX_RUN + 4;
