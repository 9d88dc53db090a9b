//! Response body delivery.
//!
//! Two strategies, picked by the caller per call:
//!
//! * [`Mode::Normal`] - one bounded read straight into the caller's buffer,
//!   capped at whatever is left of the `Content-Length`.
//! * [`Mode::Chunked`] - one whole chunk per call: the hex size line, exactly
//!   that many payload bytes, then the CRLF after them.
//!
//! Both return `Ok(n)` with `n > 0` for data and `Ok(0)` once the body is
//! over, so the caller loops until it sees zero.

use super::error::Error;
use super::line::{Line, Position, read_line, skip_section};
use super::response::Framing;
use crate::network::Transport;

/// Longest chunk-size line (size, extensions, CR) the decoder accepts.
pub const CHUNK_SIZE_LINE_LEN: usize = 128;

/// How [`Client::receive_response`](super::Client::receive_response) reads
/// the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Bounded single read per call.
    Normal,
    /// One decoded chunk per call.
    Chunked,
}

/// Per-response body progress.
#[derive(Debug, Clone)]
pub struct BodyReader {
    remaining: Option<usize>,
    pending_chunk: Option<usize>,
    finished: bool,
}

impl BodyReader {
    /// Start reading a body framed as `framing`.
    pub fn new(framing: Framing) -> Self {
        Self {
            remaining: match framing {
                Framing::ContentLength(n) => Some(n),
                Framing::Chunked => None,
            },
            pending_chunk: None,
            finished: false,
        }
    }

    /// Whether the end of the body has been reported.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Content-length bytes not yet delivered, when the body is length-framed.
    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    /// Deliver the next piece of body into `out`.
    ///
    /// # Errors
    ///
    /// * [`Error::Parameter`] - `out` is empty
    /// * [`Error::BufferFull`] - chunked mode and the next chunk is larger than
    ///   `out`; the chunk stays pending, so retrying with a large enough buffer
    ///   picks it up
    /// * [`Error::Parse`] - malformed chunk size or missing chunk CRLF
    /// * [`Error::TransportClosed`] - the peer closed mid-body
    /// * [`Error::Timeout`] - the read timed out
    pub fn read<C: Transport>(
        &mut self,
        connection: &mut C,
        mode: Mode,
        out: &mut [u8],
    ) -> Result<usize, Error> {
        if out.is_empty() {
            return Err(Error::Parameter);
        }
        if self.finished {
            return Ok(0);
        }
        match mode {
            Mode::Normal => self.read_normal(connection, out),
            Mode::Chunked => self.read_chunk(connection, out),
        }
    }

    fn read_normal<C: Transport>(
        &mut self,
        connection: &mut C,
        out: &mut [u8],
    ) -> Result<usize, Error> {
        let limit = match self.remaining {
            Some(0) => {
                self.finished = true;
                return Ok(0);
            }
            Some(n) => n.min(out.len()),
            None => out.len(),
        };

        let n = connection.read(&mut out[..limit]).map_err(|err| {
            error!("body read failed: {}", err);
            Error::from(err)
        })?;

        if n == 0 {
            if self.remaining.is_some() {
                error!("peer closed with body bytes outstanding");
                return Err(Error::TransportClosed);
            }
            self.finished = true;
            return Ok(0);
        }

        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= n;
        }
        Ok(n)
    }

    fn read_chunk<C: Transport>(
        &mut self,
        connection: &mut C,
        out: &mut [u8],
    ) -> Result<usize, Error> {
        let size = match self.pending_chunk.take() {
            Some(size) => size,
            None => read_chunk_size(connection)?,
        };

        if size == 0 {
            debug!("no more chunk data");
            discard_trailers(connection)?;
            self.finished = true;
            return Ok(0);
        }

        if size > out.len() {
            error!("buffer is smaller than chunk size [{} > {}]", size, out.len());
            self.pending_chunk = Some(size);
            return Err(Error::BufferFull);
        }

        read_exact(connection, &mut out[..size])?;

        let mut crlf = [0u8; 2];
        read_exact(connection, &mut crlf)?;
        if &crlf != b"\r\n" {
            error!("chunk data is not followed by CRLF");
            return Err(Error::Parse);
        }

        Ok(size)
    }
}

fn read_chunk_size<C: Transport>(connection: &mut C) -> Result<usize, Error> {
    let mut line = [0u8; CHUNK_SIZE_LINE_LEN];
    let len = match read_line(connection, &mut line)? {
        Line::Complete(len) => len,
        Line::Truncated(..) => {
            error!("chunk size line too long");
            return Err(Error::Parse);
        }
        Line::Closed(_) => {
            error!("peer closed before chunk size");
            return Err(Error::TransportClosed);
        }
    };
    parse_chunk_size(&line[..len]).ok_or_else(|| {
        error!("chunk length invalid");
        Error::Parse
    })
}

/// Hex size before any `;` extension, surrounding whitespace ignored.
fn parse_chunk_size(line: &[u8]) -> Option<usize> {
    let size = match line.iter().position(|&b| b == b';') {
        Some(idx) => &line[..idx],
        None => line,
    };
    let size = size.trim_ascii();
    if size.is_empty() {
        return None;
    }
    size.iter().try_fold(0usize, |acc, &b| {
        let digit = (b as char).to_digit(16)?;
        acc.checked_mul(16)?.checked_add(digit as usize)
    })
}

/// Skip trailer fields after the last chunk, through the final blank line.
fn discard_trailers<C: Transport>(connection: &mut C) -> Result<(), Error> {
    if !skip_section(connection, Position::LineStart)? {
        warn!("peer closed before the end of the chunked body");
    }
    Ok(())
}

fn read_exact<C: Transport>(connection: &mut C, mut out: &mut [u8]) -> Result<(), Error> {
    while !out.is_empty() {
        match connection.read(out) {
            Ok(0) => {
                error!("peer closed mid-chunk");
                return Err(Error::TransportClosed);
            }
            Ok(n) => {
                let tmp = out;
                out = &mut tmp[n..];
            }
            Err(err) => {
                error!("chunk read failed: {}", err);
                return Err(err.into());
            }
        }
    }
    Ok(())
}
