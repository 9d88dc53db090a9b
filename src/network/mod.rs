//! Transport abstraction for the HTTP engine.
//!
//! The engine never talks to sockets directly. It drives anything that
//! implements the small blocking [`Read`], [`Write`] and [`Close`] traits
//! below, which keeps the protocol code usable on `no_std` targets where the
//! byte stream comes from a vendor TCP stack, and lets tests script the peer.
//!
//! With the `std` feature, [`transport`] supplies the real thing: a TCP
//! connector and a [`transport::Stream`] that is either plain TCP or, with the
//! `tls` feature, a rustls-secured stream.

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for transport operations
pub mod error;

/// Application protocols built on the transport traits
pub mod application;

/// Socket-backed transports
#[cfg(feature = "std")]
pub mod transport;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Transport, Write};
}

/// Blocking byte source.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read up to `buf.len()` bytes; `Ok(0)` means the peer closed the stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Blocking byte sink.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection, returning how much was accepted
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Orderly shutdown of a connection.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

/// A connection whose read and write faults are reported as [`error::Error`].
///
/// The HTTP engine needs to tell a timeout apart from a closed peer, so it is
/// generic over this rather than over bare [`Connection`]. Implemented for
/// every connection that qualifies.
pub trait Transport:
    Connection + Read<Error = error::Error> + Write<Error = error::Error>
{
}

impl<T> Transport for T
where
    T: Connection + Read<Error = error::Error> + Write<Error = error::Error>,
{
}
