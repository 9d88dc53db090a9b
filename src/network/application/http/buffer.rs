//! Fixed-capacity header buffer.
//!
//! One caller-owned byte region serves two purposes over a transaction: the
//! caller composes the outgoing request header into it, and the response
//! parser later captures the incoming header lines into the same storage. The
//! buffer never grows. Every write that would run past the end reports
//! [`Error::BufferFull`] instead.

use core::fmt;

use super::error::Error;

/// HTTP request methods accepted by [`HeaderBuffer::request_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    /// The method token as it appears on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }
}

/// Caller-owned storage plus a used-length cursor.
///
/// Invariant: `used <= capacity` at all times.
#[derive(Debug)]
pub struct HeaderBuffer<'a> {
    buf: &'a mut [u8],
    used: usize,
}

impl<'a> HeaderBuffer<'a> {
    /// Wrap `storage`. Its whole length is the capacity.
    pub fn new(storage: &'a mut [u8]) -> Self {
        Self {
            buf: storage,
            used: 0,
        }
    }

    /// Total bytes the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes written so far.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes still free.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.used
    }

    /// Whether no bytes are free.
    pub fn is_full(&self) -> bool {
        self.used == self.buf.len()
    }

    /// The written part of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.used]
    }

    /// Zero the storage and rewind the cursor.
    pub fn reset(&mut self) {
        self.buf.fill(0);
        self.used = 0;
    }

    /// Append raw bytes at the cursor.
    ///
    /// On overflow as much as fits is still written and the cursor moves to the
    /// end, so callers must check the result rather than assume the whole
    /// slice landed.
    ///
    /// # Errors
    ///
    /// [`Error::BufferFull`] when `bytes` does not fit in the remaining space.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        let room = self.remaining();
        let n = bytes.len().min(room);
        self.buf[self.used..self.used + n].copy_from_slice(&bytes[..n]);
        self.used += n;
        if n < bytes.len() {
            warn!("header buffer is full, {} of {} bytes written", n, bytes.len());
            return Err(Error::BufferFull);
        }
        Ok(n)
    }

    /// Append formatted text, e.g. `buf.append(format_args!("Host: {}\r\n", host))`.
    ///
    /// Same truncation rules as [`append_bytes`](Self::append_bytes).
    ///
    /// # Errors
    ///
    /// * [`Error::BufferFull`] - the formatted text does not fit
    /// * [`Error::Parameter`] - a `Display` impl in `args` failed; whatever it
    ///   wrote before failing stays in the buffer
    pub fn append(&mut self, args: fmt::Arguments<'_>) -> Result<usize, Error> {
        let start = self.used;
        let mut cursor = Cursor {
            buf: self,
            overflow: false,
        };
        if fmt::write(&mut cursor, args).is_err() {
            if cursor.overflow {
                return Err(Error::BufferFull);
            }
            error!("formatting header text failed");
            return Err(Error::Parameter);
        }
        Ok(self.used - start)
    }

    /// Append `METHOD path HTTP/1.1\r\n`.
    pub fn request_line(&mut self, method: Method, path: &str) -> Result<usize, Error> {
        self.append(format_args!("{} {} HTTP/1.1\r\n", method.as_str(), path))
    }

    /// Append `name: value\r\n`.
    pub fn field(&mut self, name: &str, value: &str) -> Result<usize, Error> {
        self.append(format_args!("{}: {}\r\n", name, value))
    }

    /// Append the blank line that ends a header section.
    pub fn end_headers(&mut self) -> Result<usize, Error> {
        self.append_bytes(b"\r\n")
    }

    /// The free tail of the storage, for the response parser to read into.
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.used..]
    }

    /// Move the cursor forward over bytes written through [`spare_mut`](Self::spare_mut).
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.used = (self.used + n).min(self.buf.len());
    }
}

struct Cursor<'b, 'a> {
    buf: &'b mut HeaderBuffer<'a>,
    overflow: bool,
}

impl fmt::Write for Cursor<'_, '_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.overflow {
            return Err(fmt::Error);
        }
        match self.buf.append_bytes(s.as_bytes()) {
            Ok(_) => Ok(()),
            Err(_) => {
                self.overflow = true;
                Err(fmt::Error)
            }
        }
    }
}
