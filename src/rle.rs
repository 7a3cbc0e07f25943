use crate::{LITERAL_BUFFER_LEN, MAX_RUN};
use std::fmt::Debug;
use std::{fmt, io};

/// Compresses one byte plane into a single segment.
///
/// Feed every byte of the plane through [`update`](Self::update) (or
/// `io::Write`), then call [`finalize`](Self::finalize) to close the open run.
pub struct SegmentEncoder<W> {
    status: RunStatus,
    literal: [u8; LITERAL_BUFFER_LEN],
    literal_len: usize,
    writer: W,
}

#[derive(Copy, Clone)]
enum RunStatus {
    Run { byte: u8, count: usize },
    Wait,
}

impl<W: io::Write> SegmentEncoder<W> {
    pub fn new(writer: W) -> Self {
        SegmentEncoder {
            status: RunStatus::Wait,
            literal: [0; LITERAL_BUFFER_LEN],
            literal_len: 0,
            writer,
        }
    }

    #[inline(always)]
    pub fn update(&mut self, byte: u8) -> io::Result<()> {
        trace!("update byte 0x{byte:02X}");
        trace!("current status {:?}, pending literals {}", self.status, self.literal_len);
        match self.status {
            RunStatus::Run {
                byte: previous,
                count,
            } if previous == byte => {
                let count = count + 1;
                if count > 2 && self.literal_len > 0 {
                    trace!("replicate run starts, flush pending literals");
                    self.flush_literal()?;
                    self.status = RunStatus::Run {
                        byte: previous,
                        count,
                    };
                } else if count > MAX_RUN {
                    self.write_replicate(previous, MAX_RUN)?;
                    self.status = RunStatus::Run {
                        byte: previous,
                        count: count - MAX_RUN,
                    };
                } else {
                    self.status = RunStatus::Run {
                        byte: previous,
                        count,
                    };
                }
            }
            status => {
                self.close_run(status)?;
                while self.literal_len > MAX_RUN {
                    self.write_literal_chunk(MAX_RUN)?;
                }
                self.status = RunStatus::Run { byte, count: 1 };
                trace!("transit to {:?}", self.status);
            }
        }
        Ok(())
    }

    /// Closes the open run and returns the writer.
    pub fn finalize(mut self) -> io::Result<W> {
        let status = std::mem::replace(&mut self.status, RunStatus::Wait);
        trace!("last run: {:?}", status);
        self.close_run(status)?;
        self.flush_literal()?;
        self.writer.flush()?;
        Ok(self.writer)
    }

    // runs of one or two bytes are cheaper inside a literal run
    fn close_run(&mut self, status: RunStatus) -> io::Result<()> {
        match status {
            RunStatus::Wait => {}
            RunStatus::Run { byte, count } if count <= 2 => {
                self.literal[self.literal_len..self.literal_len + count].fill(byte);
                self.literal_len += count;
            }
            RunStatus::Run { byte, count } => {
                debug_assert_eq!(self.literal_len, 0);
                debug_assert!(count <= MAX_RUN);
                self.write_replicate(byte, count)?;
            }
        }
        Ok(())
    }

    fn flush_literal(&mut self) -> io::Result<()> {
        while self.literal_len > 0 {
            let count = self.literal_len.min(MAX_RUN);
            self.write_literal_chunk(count)?;
        }
        Ok(())
    }

    #[inline(always)]
    fn write_literal_chunk(&mut self, count: usize) -> io::Result<()> {
        debug_assert!(count >= 1 && count <= MAX_RUN);
        trace!(
            "encode literal run of {count}: {}",
            hex::encode(&self.literal[..count])
        );
        self.writer.write_all(&[(count - 1) as u8])?;
        self.writer.write_all(&self.literal[..count])?;
        self.literal.copy_within(count..self.literal_len, 0);
        self.literal_len -= count;
        Ok(())
    }

    #[inline(always)]
    fn write_replicate(&mut self, byte: u8, count: usize) -> io::Result<()> {
        debug_assert!(count >= 2 && count <= MAX_RUN);
        let control = (257 - count) as u8;
        trace!("encode replicate run of {count} x 0x{byte:02X}, control {control}");
        self.writer.write_all(&[control, byte])
    }
}

impl Debug for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Run { byte, count } => f
                .debug_struct("Run")
                .field("byte", &format!("0x{byte:02X}"))
                .field("count", &count)
                .finish(),
            RunStatus::Wait => f.write_str("Wait"),
        }
    }
}

impl<W: io::Write> io::Write for SegmentEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for byte in buf.iter() {
            self.update(*byte)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
