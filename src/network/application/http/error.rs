//! Error taxonomy of the HTTP/1.1 engine.

use core::fmt;

use crate::network::error::Error as TransportError;

/// Errors reported by the HTTP client.
///
/// Every failure travels back to the caller as one of these values. The engine
/// never retries: short reads, timeouts and closed peers are surfaced as-is and
/// any retry or backoff policy belongs to the caller.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An argument was invalid, or the operation is not allowed in the
    /// handle's current state (for example sending twice, or using a handle
    /// after it was torn down).
    Parameter,
    /// A value did not fit in its fixed-capacity storage (host or path
    /// longer than [`MAX_HOST_LEN`](super::MAX_HOST_LEN) /
    /// [`MAX_PATH_LEN`](super::MAX_PATH_LEN)).
    Memory,
    /// The URI does not start with `http://` or `https://`, or has no host.
    InvalidUri,
    /// Address resolution failed or no candidate address accepted the
    /// connection.
    Connect,
    /// The secure transport could not be set up: bad certificate material or a
    /// failed handshake.
    Secure,
    /// Writing the request header or body to the transport failed.
    Send,
    /// The response is malformed: no `HTTP/1.` status line, no usable
    /// transfer-length mechanism, or broken chunk framing.
    Parse,
    /// Composition ran out of header buffer space, or a chunk is larger than
    /// the caller's receive buffer. Recoverable.
    BufferFull,
    /// The peer closed the stream, or the read failed.
    TransportClosed,
    /// The socket-level send/receive timeout expired.
    Timeout,
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Error::Timeout,
            _ => Error::TransportClosed,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::Parameter => "invalid parameter",
            Error::Memory => "value exceeds fixed storage",
            Error::InvalidUri => "invalid uri",
            Error::Connect => "connect failed",
            Error::Secure => "secure transport setup failed",
            Error::Send => "send failed",
            Error::Parse => "malformed response",
            Error::BufferFull => "buffer full",
            Error::TransportClosed => "transport closed",
            Error::Timeout => "timed out",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Parameter => defmt::write!(f, "Parameter"),
            Error::Memory => defmt::write!(f, "Memory"),
            Error::InvalidUri => defmt::write!(f, "InvalidUri"),
            Error::Connect => defmt::write!(f, "Connect"),
            Error::Secure => defmt::write!(f, "Secure"),
            Error::Send => defmt::write!(f, "Send"),
            Error::Parse => defmt::write!(f, "Parse"),
            Error::BufferFull => defmt::write!(f, "BufferFull"),
            Error::TransportClosed => defmt::write!(f, "TransportClosed"),
            Error::Timeout => defmt::write!(f, "Timeout"),
        }
    }
}
