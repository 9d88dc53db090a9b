//! CRLF line reader.
//!
//! Reads one byte at a time so that nothing past the line terminator is ever
//! consumed from the transport; whatever follows (more header lines, the body)
//! stays in the stream for the next reader.

use super::error::Error;
use crate::network::Transport;

/// Bytes of scratch space used when skipping the rest of a section.
const SKIP_LINE_LEN: usize = 64;

/// Outcome of [`read_line`]. The count never includes the CR or LF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// A CRLF was seen. `Complete(0)` is the blank line.
    Complete(usize),
    /// The output buffer filled up before a CRLF arrived.
    ///
    /// When the last stored byte is a CR the reader has to take one more byte
    /// to see whether it is the LF. If it is not, that byte belongs to the
    /// rest of the line and is handed back here instead of being lost.
    Truncated(usize, Option<u8>),
    /// The peer closed the stream before a CRLF arrived.
    Closed(usize),
}

impl Line {
    /// Logical length of the line.
    pub fn len(&self) -> usize {
        match *self {
            Line::Complete(n) | Line::Truncated(n, _) | Line::Closed(n) => n,
        }
    }

    /// Whether the line holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this is the blank line ending a header section.
    pub fn is_blank(&self) -> bool {
        matches!(self, Line::Complete(0))
    }
}

/// Read bytes into `out` until CRLF, until `out` is full, or until the peer
/// closes.
///
/// Every byte except the final LF is stored, so a complete line of `n` bytes
/// occupies `n + 1` bytes of `out` (the CR sits at `out[n]`). A CR and LF that
/// arrive in separate reads are still recognised as one terminator. A lone LF
/// is ordinary data. When a CR lands in the last slot one more byte is read to
/// look for its LF; if it is something else it comes back in
/// [`Line::Truncated`].
///
/// # Errors
///
/// Transport faults are mapped through [`Error::from`]; a timeout becomes
/// [`Error::Timeout`].
pub fn read_line<C: Transport>(connection: &mut C, out: &mut [u8]) -> Result<Line, Error> {
    read_line_from(connection, out, 0)
}

/// [`read_line`] with `out[..filled]` already holding the start of the line.
fn read_line_from<C: Transport>(
    connection: &mut C,
    out: &mut [u8],
    filled: usize,
) -> Result<Line, Error> {
    let mut count = filled;
    let mut last = if filled > 0 { out[filled - 1] } else { 0 };

    loop {
        let full = count >= out.len();
        if full && last != b'\r' {
            warn!("line buffer is full, data may be incomplete [{} bytes]", count);
            return Ok(Line::Truncated(count, None));
        }

        let mut byte = [0u8; 1];
        match connection.read(&mut byte) {
            Ok(0) => return Ok(Line::Closed(count)),
            Ok(_) => {}
            Err(err) => {
                error!("line read failed: {}", err);
                return Err(err.into());
            }
        }

        if byte[0] == b'\n' && last == b'\r' {
            return Ok(Line::Complete(count - 1));
        }
        if full {
            warn!("line buffer is full, data may be incomplete [{} bytes]", count);
            return Ok(Line::Truncated(count, Some(byte[0])));
        }

        out[count] = byte[0];
        count += 1;
        last = byte[0];
    }
}

/// Where the stream sits when a reader stops short of a section's blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    /// At the start of a line.
    LineStart,
    /// Inside a line that was cut short, with the byte [`Line::Truncated`]
    /// handed back, if any.
    InLine(Option<u8>),
}

/// Consume lines up to and including the blank line that ends a header or
/// trailer section.
///
/// From [`Position::InLine`] the rest of the current line is skipped first
/// and never counts as the blank line. Returns `false` if the peer closed
/// before the blank line.
pub(crate) fn skip_section<C: Transport>(
    connection: &mut C,
    from: Position,
) -> Result<bool, Error> {
    let mut scratch = [0u8; SKIP_LINE_LEN];
    let (mut in_line, mut carry) = match from {
        Position::LineStart => (false, None),
        Position::InLine(carry) => (true, carry),
    };

    loop {
        let filled = match carry.take() {
            Some(byte) => {
                scratch[0] = byte;
                1
            }
            None => 0,
        };
        match read_line_from(connection, &mut scratch, filled)? {
            Line::Complete(0) if !in_line => return Ok(true),
            Line::Complete(_) => {
                trace!("skipped line");
                in_line = false;
            }
            Line::Truncated(_, next) => {
                in_line = true;
                carry = next;
            }
            Line::Closed(_) => return Ok(false),
        }
    }
}
