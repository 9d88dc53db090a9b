//! Socket-backed transports.
//!
//! [`Stream`] is what [`Client::connect`](crate::network::application::http::Client::connect)
//! hands to the engine: plain TCP for `http://`, or TCP wrapped in rustls for
//! `https://` when the `tls` feature is enabled. Either way it implements the
//! crate's [`Read`], [`Write`] and [`Close`] traits with
//! [`error::Error`](super::error::Error) faults.

use std::io::{Read as _, Write as _};
use std::net::TcpStream;

use super::error::Error;
use super::{Close, Connect, Connection, Read, Write};
use crate::network::application::http::client::open_stream;
use crate::network::application::http::{Error as HttpError, Options, Uri};

/// Resolver and connector
pub mod tcp;

/// rustls secure transport
#[cfg(feature = "tls")]
pub mod tls;

/// A connected byte stream, optionally secured.
#[derive(Debug)]
pub enum Stream {
    /// Plain TCP.
    Plain(TcpStream),
    /// TCP carrying a TLS session.
    #[cfg(feature = "tls")]
    Secure(Box<tls::TlsStream>),
}

impl Stream {
    /// Whether the stream runs over TLS.
    pub fn is_secure(&self) -> bool {
        match self {
            Stream::Plain(_) => false,
            #[cfg(feature = "tls")]
            Stream::Secure(_) => true,
        }
    }

    /// The underlying socket.
    pub fn socket(&self) -> &TcpStream {
        match self {
            Stream::Plain(socket) => socket,
            #[cfg(feature = "tls")]
            Stream::Secure(secured) => &secured.sock,
        }
    }

    /// Protocol agreed through ALPN, if any.
    pub fn alpn_protocol(&self) -> Option<&[u8]> {
        match self {
            Stream::Plain(_) => None,
            #[cfg(feature = "tls")]
            Stream::Secure(secured) => secured.conn.alpn_protocol(),
        }
    }
}

impl Read for Stream {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let result = match self {
            Stream::Plain(socket) => socket.read(buf),
            #[cfg(feature = "tls")]
            Stream::Secure(secured) => secured.read(buf),
        };
        result.map_err(Error::from)
    }
}

impl Write for Stream {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let result = match self {
            Stream::Plain(socket) => socket.write(buf),
            #[cfg(feature = "tls")]
            Stream::Secure(secured) => secured.write(buf),
        };
        result.map_err(|err| match Error::from(err) {
            Error::Timeout => Error::Timeout,
            _ => Error::WriteError,
        })
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        let result = match self {
            Stream::Plain(socket) => socket.flush(),
            #[cfg(feature = "tls")]
            Stream::Secure(secured) => secured.flush(),
        };
        result.map_err(|_| Error::WriteError)
    }
}

impl Close for Stream {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        match self {
            Stream::Plain(socket) => tcp::shutdown(&socket),
            #[cfg(feature = "tls")]
            Stream::Secure(secured) => tls::close(*secured),
        }
    }
}

impl Connection for Stream {}

/// Opens a [`Stream`] for an `http://` or `https://` URI.
///
/// The same resolution, port and TLS rules as
/// [`Client::connect`](crate::network::application::http::Client::connect),
/// for callers that want to own the transport before handing it to
/// [`Client::new`](crate::network::application::http::Client::new).
#[derive(Debug, Clone, Copy, Default)]
pub struct Connector<'a> {
    /// Timeout, version and certificate material.
    pub options: Options<'a>,
    /// Overrides the URI's port when set.
    pub port: Option<u16>,
}

impl Connect for Connector<'_> {
    type Connection = Stream;
    type Error = HttpError;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        let uri = Uri::parse(remote)?;
        open_stream(&uri, self.port, &self.options)
    }
}
