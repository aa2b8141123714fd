//! net/line_buffer.rs
//!
//! Inbound framing: one JSON document per `\n`-terminated line.
//! Bytes accumulate until a newline shows up; a line that outgrows the limit
//! is reported once and then skipped up to its terminating newline.

use bytes::{Bytes, BytesMut};
use memchr::memchr;
use tokio::io::{AsyncRead, AsyncReadExt};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

pub const DEFAULT_MAX_LINE_BYTES: usize = 4 * 1024;

const READ_CAPACITY_HINT: usize = 4 * 1024;

// -----------------------------------------------------------------------------
// ----- LineBuffer ------------------------------------------------------------

#[derive(Debug)]
pub struct LineBuffer {
    inbox: BytesMut,
    max_line_bytes: usize,
    discarding: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A complete line, newline (and any trailing `\r`) stripped.
    Payload(Bytes),

    /// A line longer than the limit. Reported once per offending line.
    Oversized,
}

impl LineBuffer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            inbox: BytesMut::with_capacity(READ_CAPACITY_HINT),
            max_line_bytes,
            discarding: false,
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}

// -----------------------------------------------------------------------------
// ----- LineBuffer: Public ----------------------------------------------------

impl LineBuffer {
    /// Read whatever the socket has. `Ok(0)` means the peer closed.
    pub async fn fill_from<R>(&mut self, reader: &mut R) -> std::io::Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        self.inbox.reserve(READ_CAPACITY_HINT);
        reader.read_buf(&mut self.inbox).await
    }

    pub fn next_line(&mut self) -> Option<Line> {
        loop {
            let Some(pos) = memchr(b'\n', &self.inbox) else {
                return self.check_overflow();
            };

            let mut line = self.inbox.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }

            if std::mem::take(&mut self.discarding) {
                // Tail of a line already reported as oversized.
                continue;
            }

            if line.len() > self.max_line_bytes {
                return Some(Line::Oversized);
            }

            return Some(Line::Payload(line.freeze()));
        }
    }
}

// -----------------------------------------------------------------------------
// ----- LineBuffer: Private ---------------------------------------------------

impl LineBuffer {
    fn check_overflow(&mut self) -> Option<Line> {
        if self.inbox.len() <= self.max_line_bytes {
            return None;
        }

        self.inbox.clear();

        if self.discarding {
            return None;
        }

        self.discarding = true;
        Some(Line::Oversized)
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
