use crate::error::{CodecError, Result};
use crate::{HEADER_LEN, MAX_SEGMENTS};
use std::ops::Range;

/// The 64 byte table in front of every compressed frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RleHeader {
    pub segment_count: u32,
    /// Absolute offsets from the start of the header, zero past `segment_count`.
    pub offsets: [u32; MAX_SEGMENTS],
}

impl RleHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            error!("compressed frame of {} bytes has no room for a header", data.len());
            return Err(CodecError::TruncatedHeader(data.len()));
        }
        let mut words = data[..HEADER_LEN]
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]));
        let segment_count = words.next().unwrap_or_default();
        if segment_count == 0 || segment_count as usize > MAX_SEGMENTS {
            error!("RLE header declares {segment_count} segments");
            return Err(CodecError::InvalidHeader(format!(
                "segment count {segment_count} outside 1..=15"
            )));
        }
        let mut offsets = [0u32; MAX_SEGMENTS];
        for (slot, word) in offsets.iter_mut().zip(words) {
            *slot = word;
        }
        trace!("parsed header: {segment_count} segments at {:?}", offsets);
        Ok(RleHeader {
            segment_count,
            offsets,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[..4].copy_from_slice(&self.segment_count.to_le_bytes());
        for (chunk, offset) in bytes[4..].chunks_exact_mut(4).zip(self.offsets.iter()) {
            chunk.copy_from_slice(&offset.to_le_bytes());
        }
        bytes
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segment_count as usize
    }

    /// Byte range of `segment` inside a compressed frame of `total_len` bytes.
    ///
    /// The last segment runs to the end of the frame. Offsets past the end of
    /// a truncated frame are clamped to it, so the segment decodes short.
    pub fn segment_range(&self, segment: usize, total_len: usize) -> Result<Range<usize>> {
        let count = self.segment_count();
        if segment >= count {
            return Err(CodecError::SegmentOutOfRange { segment, count });
        }
        let check = |segment: usize| -> Result<usize> {
            let offset = self.offsets[segment];
            if (offset as usize) < HEADER_LEN {
                error!("segment {segment} offset {offset} points into the header");
                return Err(CodecError::InvalidSegmentOffset { segment, offset });
            }
            Ok(offset as usize)
        };
        let start = check(segment)?;
        let end = if segment + 1 < count {
            let next = check(segment + 1)?;
            if next < start {
                error!("segment {} starts before segment {segment}", segment + 1);
                return Err(CodecError::InvalidSegmentOffset {
                    segment: segment + 1,
                    offset: self.offsets[segment + 1],
                });
            }
            next
        } else {
            total_len.max(start)
        };
        if end > total_len {
            warn!("segment {segment} ({start}..{end}) is cut short at {total_len} bytes");
        }
        Ok(start.min(total_len)..end.min(total_len))
    }
}
