//! Response status line and header parsing.
//!
//! The parser captures header lines straight into the caller's
//! [`HeaderBuffer`], replacing each CR with a NUL so the region reads as a
//! table of NUL-terminated lines, and records where every line starts and ends.
//! Field lookups then walk that index instead of rescanning the bytes.

use heapless::Vec;

use super::buffer::HeaderBuffer;
use super::error::Error;
use super::line::{Line, Position, read_line, skip_section};
use crate::network::Transport;

/// Most header lines (status line included) the index keeps track of.
pub const MAX_HEADER_LINES: usize = 64;

const STATUS_TOKEN: &[u8] = b"HTTP/1.";

/// How the length of the response body is signalled.
///
/// HTTP allows one mechanism per message. When a response carries both
/// `Content-Length` and `Transfer-Encoding`, the content length wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `Content-Length: n`.
    ContentLength(usize),
    /// `Transfer-Encoding: chunked`.
    Chunked,
}

/// Metadata extracted from a response header section.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    /// Numeric status code from the status line.
    pub status: u16,
    /// The active transfer-length mechanism.
    pub framing: Framing,
    /// `false` when the buffer or the line index filled up, or the peer
    /// closed, before the blank line ending the header section was seen.
    pub complete: bool,
    lines: Vec<(usize, usize), MAX_HEADER_LINES>,
}

impl ResponseHead {
    /// Content length, when that is the active mechanism.
    pub fn content_length(&self) -> Option<usize> {
        match self.framing {
            Framing::ContentLength(n) => Some(n),
            Framing::Chunked => None,
        }
    }

    /// Whether the body arrives chunked.
    pub fn is_chunked(&self) -> bool {
        self.framing == Framing::Chunked
    }

    /// Read-only view of the captured header lines inside `buffer`.
    pub fn headers<'h>(&'h self, buffer: &'h HeaderBuffer<'_>) -> Headers<'h> {
        Headers {
            bytes: buffer.as_bytes(),
            lines: &self.lines,
        }
    }
}

/// Indexed, read-only view over captured header lines.
#[derive(Debug, Clone, Copy)]
pub struct Headers<'h> {
    bytes: &'h [u8],
    lines: &'h [(usize, usize)],
}

impl<'h> Headers<'h> {
    /// Every captured line, status line first, without terminators.
    pub fn lines(&self) -> impl Iterator<Item = &'h [u8]> + 'h {
        let bytes = self.bytes;
        self.lines.iter().map(move |&(start, end)| &bytes[start..end])
    }

    /// Value of the first field whose name matches `name`.
    ///
    /// Names compare ASCII case-insensitively and must be followed by `:`.
    /// One leading space and any trailing whitespace are stripped from the
    /// value. Returns `None` if no line matches or the value is not UTF-8.
    pub fn get(&self, name: &str) -> Option<&'h str> {
        let name = name.as_bytes();
        self.lines().find_map(|line| {
            if line.len() <= name.len() || line[name.len()] != b':' {
                return None;
            }
            if !line[..name.len()].eq_ignore_ascii_case(name) {
                return None;
            }
            let mut value = &line[name.len() + 1..];
            if let [b' ', rest @ ..] = value {
                value = rest;
            }
            core::str::from_utf8(value).ok().map(str::trim_end)
        })
    }

    /// The status line, if one was captured.
    pub fn status_line(&self) -> Option<&'h [u8]> {
        self.lines().next()
    }
}

/// Capture and parse a response header section.
///
/// Resets `buffer`, then reads lines into it until the blank line. Running
/// out of buffer space or index slots before the blank line is not an error:
/// parsing proceeds on what was captured and [`ResponseHead::complete`] is
/// `false`. The uncaptured rest of the header section is still consumed, so
/// the transport is left at the first body byte either way.
///
/// # Errors
///
/// * [`Error::Parse`] - no `HTTP/1.` status token, no status digits, or
///   neither a `Content-Length` nor a chunked `Transfer-Encoding`
/// * [`Error::TransportClosed`] - the peer closed before sending anything
/// * [`Error::Timeout`] - the read timed out
pub fn read_head<C: Transport>(
    connection: &mut C,
    buffer: &mut HeaderBuffer<'_>,
) -> Result<ResponseHead, Error> {
    buffer.reset();

    let mut lines: Vec<(usize, usize), MAX_HEADER_LINES> = Vec::new();
    let mut complete = false;
    let mut unread = None;

    debug!("http response header:");
    loop {
        if buffer.is_full() {
            warn!("header buffer is full, response header may be incomplete");
            unread = Some(Position::LineStart);
            break;
        }

        let start = buffer.used();
        let line = read_line(connection, buffer.spare_mut())?;
        let len = line.len();

        let resume = match line {
            Line::Complete(0) => {
                // The CR of the blank line sits in the spare area.
                buffer.spare_mut()[0] = 0;
                complete = true;
                break;
            }
            Line::Complete(_) => {
                buffer.spare_mut()[len] = 0;
                buffer.advance(len + 1);
                Some(Position::LineStart)
            }
            Line::Truncated(_, carry) => {
                buffer.advance(len);
                Some(Position::InLine(carry))
            }
            Line::Closed(_) => {
                if len == 0 && start == 0 {
                    error!("peer closed before sending a response");
                    return Err(Error::TransportClosed);
                }
                let spare = buffer.spare_mut();
                let terminated = len < spare.len();
                if terminated {
                    spare[len] = 0;
                }
                buffer.advance(if terminated { len + 1 } else { len });
                None
            }
        };

        if len > 0 {
            trace_line(&buffer.as_bytes()[start..start + len]);
            if lines.push((start, start + len)).is_err() {
                warn!("more than {} header lines, ignoring the rest", MAX_HEADER_LINES);
                unread = resume;
                break;
            }
        }

        match line {
            Line::Truncated(..) => {
                warn!("header line truncated, response header is incomplete");
                unread = resume;
                break;
            }
            Line::Closed(_) => {
                warn!("peer closed inside the response header");
                break;
            }
            Line::Complete(_) => {}
        }
    }

    if let Some(from) = unread {
        if !skip_section(connection, from)? {
            warn!("peer closed inside the uncaptured response header");
        }
    }

    let status = parse_status(buffer.as_bytes())?;

    let headers = Headers {
        bytes: buffer.as_bytes(),
        lines: &lines,
    };
    let framing = if let Some(value) = headers.get("Content-Length") {
        Framing::ContentLength(parse_decimal(value).ok_or_else(|| {
            error!("invalid Content-Length value");
            Error::Parse
        })?)
    } else if headers.get("Transfer-Encoding").is_some_and(is_chunked_coding) {
        info!("chunked mode");
        Framing::Chunked
    } else {
        error!("response has neither Content-Length nor chunked Transfer-Encoding");
        return Err(Error::Parse);
    };

    let head = ResponseHead {
        status,
        framing,
        complete,
        lines,
    };
    if !head.complete {
        warn!("response header is incomplete, parsed what was captured");
    }
    Ok(head)
}

fn trace_line(line: &[u8]) {
    if let Ok(text) = core::str::from_utf8(line) {
        trace!("{}", text);
    }
}

/// Locate `HTTP/1.` anywhere in the captured bytes and read the status code
/// that follows the minor version.
fn parse_status(bytes: &[u8]) -> Result<u16, Error> {
    let pos = bytes
        .windows(STATUS_TOKEN.len())
        .position(|w| w == STATUS_TOKEN)
        .ok_or_else(|| {
            error!("can not find response status line");
            Error::Parse
        })?;

    let mut rest = &bytes[pos + STATUS_TOKEN.len()..];
    while let [b'0'..=b'9', tail @ ..] = rest {
        rest = tail;
    }
    while let [b' ', tail @ ..] = rest {
        rest = tail;
    }

    let mut status: u16 = 0;
    let mut digits = 0;
    for &b in rest.iter().take_while(|b| b.is_ascii_digit()) {
        status = status
            .checked_mul(10)
            .and_then(|s| s.checked_add(u16::from(b - b'0')))
            .ok_or(Error::Parse)?;
        digits += 1;
    }
    if digits == 0 {
        error!("status line has no status code");
        return Err(Error::Parse);
    }
    Ok(status)
}

/// Leading decimal digits of `value`, after leading whitespace.
fn parse_decimal(value: &str) -> Option<usize> {
    let digits = value.trim_start();
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse().ok()
}

/// `chunked` must be the final transfer coding.
fn is_chunked_coding(value: &str) -> bool {
    value
        .rsplit(',')
        .next()
        .is_some_and(|last| last.trim().eq_ignore_ascii_case("chunked"))
}
