/// How decoding of one segment ended.
///
/// Only [`Complete`](SegmentStatus::Complete) means every run was consumed;
/// the other two are recoverable damage, the destination keeps whatever was
/// written before the fault.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SegmentStatus {
    Complete(usize),
    /// A run asked for more bytes than the segment holds.
    SourceExhausted(usize),
    /// The destination was full before the segment ended.
    DestinationFull(usize),
}

impl SegmentStatus {
    /// Bytes written into the destination.
    pub fn written(&self) -> usize {
        match *self {
            SegmentStatus::Complete(n)
            | SegmentStatus::SourceExhausted(n)
            | SegmentStatus::DestinationFull(n) => n,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SegmentStatus::Complete(_))
    }
}

/// Replays the runs of one segment into a fixed-size plane.
pub struct SegmentDecoder<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl<'a> SegmentDecoder<'a> {
    pub fn new(dst: &'a mut [u8]) -> SegmentDecoder<'a> {
        SegmentDecoder { dst, pos: 0 }
    }

    #[inline(always)]
    fn room(&self) -> usize {
        self.dst.len() - self.pos
    }

    pub fn decode(mut self, segment: &[u8]) -> SegmentStatus {
        let end = segment.len();
        let mut i = 0;
        while i < end {
            let control = segment[i];
            i += 1;
            trace!("control {control} at {}, written {}", i - 1, self.pos);
            if control & 0x80 != 0 {
                let count = 257 - control as usize;
                if i >= end {
                    warn!("RLE segment ends inside a replicate run");
                    return SegmentStatus::SourceExhausted(self.pos);
                }
                let byte = segment[i];
                i += 1;
                if count > self.room() {
                    let room = self.room();
                    self.dst[self.pos..].fill(byte);
                    self.pos += room;
                    warn!("RLE segment unexpectedly too long, ignoring remaining data");
                    return SegmentStatus::DestinationFull(self.pos);
                }
                self.dst[self.pos..self.pos + count].fill(byte);
                self.pos += count;
            } else {
                if control == 0 && i == end {
                    trace!("single pad byte closes the segment");
                    break;
                }
                let count = control as usize + 1;
                let take = count.min(end - i);
                if take > self.room() {
                    let room = self.room();
                    self.dst[self.pos..].copy_from_slice(&segment[i..i + room]);
                    self.pos += room;
                    warn!("RLE segment unexpectedly too long, ignoring remaining data");
                    return SegmentStatus::DestinationFull(self.pos);
                }
                self.dst[self.pos..self.pos + take].copy_from_slice(&segment[i..i + take]);
                self.pos += take;
                i += take;
                if take < count {
                    warn!(
                        "RLE segment ends inside a literal run, {} of {count} bytes present",
                        take
                    );
                    return SegmentStatus::SourceExhausted(self.pos);
                }
            }
        }
        SegmentStatus::Complete(self.pos)
    }
}

/// Decodes `segment` into `dst`, see [`SegmentDecoder`].
pub fn decode_segment(segment: &[u8], dst: &mut [u8]) -> SegmentStatus {
    SegmentDecoder::new(dst).decode(segment)
}

#[cfg(test)]
mod tests {
    use super::{decode_segment, SegmentStatus};
    use crate::SegmentEncoder;
    use std::io::Write;
    use crate::tests::setup;

    /// (encoded segment, destination size, expected plane, expected status)
    const TEST_VECTOR: [(&str, usize, &str, SegmentStatus); 9] = [
        ("f905", 8, "0505050505050505", SegmentStatus::Complete(8)),
        ("0301020304", 4, "01020304", SegmentStatus::Complete(4)),
        ("0309090102", 4, "09090102", SegmentStatus::Complete(4)),
        ("01090901010200", 4, "09090102", SegmentStatus::Complete(4)),
        // a short segment leaves the tail untouched
        ("0301020304", 6, "010203040000", SegmentStatus::Complete(4)),
        ("02010203fd0700", 7, "01020307070707", SegmentStatus::Complete(7)),
        // a zero inside the segment is a one byte literal run
        ("0005fe07", 4, "05070707", SegmentStatus::Complete(4)),
        ("fe07", 2, "0707", SegmentStatus::DestinationFull(2)),
        ("030102", 4, "01020000", SegmentStatus::SourceExhausted(2)),
    ];

    #[test]
    fn test_segment_decode() {
        setup();
        for (input, len, expected, status) in TEST_VECTOR.into_iter() {
            let input = hex::decode(input).unwrap();
            let expected = hex::decode(expected).unwrap();
            let mut out = vec![0u8; len];
            assert_eq!(decode_segment(&input, &mut out), status, "input {}", hex::encode(&input));
            assert_eq!(expected, out);
        }
    }

    #[test]
    fn test_pad_byte_after_full_plane() {
        setup();
        let mut out = [0u8; 3];
        let status = decode_segment(&[0x02, 1, 2, 3, 0x00], &mut out);
        assert_eq!(status, SegmentStatus::Complete(3));
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn test_control_128_replicates_129() {
        setup();
        let mut out = vec![0u8; 200];
        let status = decode_segment(&[0x80, 0x09], &mut out);
        assert_eq!(status, SegmentStatus::Complete(129));
        assert!(out[..129].iter().all(|b| *b == 9));
        assert!(out[129..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_replicate_without_data_byte() {
        setup();
        let mut out = [0xEEu8; 4];
        let status = decode_segment(&[0x01, 7, 8, 0xFD], &mut out);
        assert_eq!(status, SegmentStatus::SourceExhausted(2));
        assert_eq!(out, [7, 8, 0xEE, 0xEE]);
    }

    #[test]
    fn test_overlong_literal_is_clipped() {
        setup();
        let mut out = [0u8; 3];
        let status = decode_segment(&[0x04, 1, 2, 3, 4, 5], &mut out);
        assert_eq!(status, SegmentStatus::DestinationFull(3));
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn test_truncated_segment_never_overruns() {
        setup();
        let plane: Vec<u8> = (0..500u32)
            .map(|i| if i % 97 < 40 { 0x33 } else { (i * 7) as u8 })
            .collect();
        let mut encoded = vec![];
        let mut encoder = SegmentEncoder::new(&mut encoded);
        encoder.write_all(&plane).unwrap();
        encoder.finalize().unwrap();

        for cut in 0..=encoded.len() {
            let mut out = vec![0u8; plane.len()];
            let status = decode_segment(&encoded[..cut], &mut out);
            assert!(status.written() <= plane.len());
            assert_eq!(&out[..status.written()], &plane[..status.written()]);
            assert!(out[status.written()..].iter().all(|b| *b == 0));
        }

        // a destination that is too small is filled and nothing more
        let mut small = vec![0u8; 100];
        let status = decode_segment(&encoded, &mut small);
        assert_eq!(status, SegmentStatus::DestinationFull(100));
        assert_eq!(&small[..], &plane[..100]);
    }

    #[test]
    fn test_encoded_segment_decodes() {
        setup();
        let plane = [5u8, 5, 5, 5, 5, 5, 5, 5];
        let mut encoded = vec![];
        let mut encoder = SegmentEncoder::new(&mut encoded);
        encoder.write_all(&plane).unwrap();
        encoder.finalize().unwrap();
        assert_eq!(encoded, vec![249, 5]);

        let mut out = [0u8; 8];
        assert!(decode_segment(&encoded, &mut out).is_complete());
        assert_eq!(out, plane);
    }
}
