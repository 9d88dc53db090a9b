//! HTTP/2 session shell.
//!
//! Framing, HPACK and flow control live in an external frame engine that
//! implements [`Multiplexer`]. A [`Session`] owns the transport and moves
//! bytes between the two: everything the multiplexer queues is written out,
//! and everything the peer sends is handed back to it together with the
//! caller's [`FrameHandler`], which sees decoded header blocks, DATA payloads
//! and stream closes.
//!
//! # Usage
//!
//! ```rust,no_run
//! use libhttpc::network::application::http2::{HeaderField, Session};
//! # use libhttpc::network::application::http2::{BodySource, FrameHandler, Multiplexer};
//! # use libhttpc::network::application::http::Options;
//! # struct Engine;
//! # struct NoBody;
//! # impl BodySource for NoBody {
//! #     type Error = ();
//! #     fn read(&mut self, _: u32, _: &mut [u8]) -> Result<(usize, bool), ()> { Ok((0, true)) }
//! # }
//! # impl Multiplexer for Engine {
//! #     type Error = ();
//! #     type Body = NoBody;
//! #     fn start(&mut self) -> Result<(), ()> { Ok(()) }
//! #     fn submit_request(
//! #         &mut self,
//! #         _: &[HeaderField<'_>],
//! #         _: Option<NoBody>,
//! #     ) -> Result<u32, ()> {
//! #         Ok(1)
//! #     }
//! #     fn pending_send(&mut self) -> Result<&[u8], ()> { Ok(&[]) }
//! #     fn receive(&mut self, input: &[u8], _: &mut dyn FrameHandler) -> Result<usize, ()> {
//! #         Ok(input.len())
//! #     }
//! #     fn is_active(&self) -> bool { false }
//! # }
//! struct Printer;
//!
//! impl libhttpc::network::application::http2::FrameHandler for Printer {
//!     fn on_data(&mut self, stream_id: u32, data: &[u8], _end_stream: bool) {
//!         println!("stream {stream_id}: {} bytes", data.len());
//!     }
//! }
//!
//! # fn main() -> Result<(), libhttpc::network::application::http::Error> {
//! let mut session = Session::connect(
//!     "https://example.com/get",
//!     None,
//!     &Options::default(),
//!     Engine,
//!     Printer,
//! )?;
//! let stream_id = session.submit_request(
//!     &[
//!         HeaderField::new(":method", "GET"),
//!         HeaderField::new(":scheme", "https"),
//!         HeaderField::new(":authority", "example.com"),
//!         HeaderField::new(":path", "/get"),
//!     ],
//!     None,
//! )?;
//! session.run()?;
//! session.close()?;
//! # let _ = stream_id;
//! # Ok(())
//! # }
//! ```

use crate::network::application::http::Error;
use crate::network::application::http::client::write_all;
use crate::network::error::Error as NetError;
use crate::network::Transport;

/// Largest read handed to the multiplexer per [`Session::run_once`].
pub const RECEIVE_CHUNK_LEN: usize = 4096;

/// One name/value pair of an HTTP/2 header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderField<'a> {
    /// Field name; pseudo-headers start with `:`.
    pub name: &'a str,
    /// Field value.
    pub value: &'a str,
}

impl<'a> HeaderField<'a> {
    /// Pair `name` with `value`.
    pub const fn new(name: &'a str, value: &'a str) -> Self {
        Self { name, value }
    }
}

/// Supplies the DATA frames of a request body.
pub trait BodySource {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Fill `buf` with the next piece of the body for `stream_id`.
    ///
    /// Returns the number of bytes written and whether this was the last
    /// piece.
    fn read(&mut self, stream_id: u32, buf: &mut [u8]) -> Result<(usize, bool), Self::Error>;
}

/// Receives what the multiplexer decodes from the peer.
///
/// Every callback has an empty default so handlers only implement what they
/// care about.
pub trait FrameHandler {
    /// A response header block for `stream_id`.
    fn on_headers(&mut self, stream_id: u32, fields: &[HeaderField<'_>]) {
        let _ = (stream_id, fields);
    }

    /// A DATA payload for `stream_id`.
    fn on_data(&mut self, stream_id: u32, data: &[u8], end_stream: bool) {
        let _ = (stream_id, data, end_stream);
    }

    /// `stream_id` closed; `error_code` is the HTTP/2 error code, 0 when clean.
    fn on_stream_close(&mut self, stream_id: u32, error_code: u32) {
        let _ = (stream_id, error_code);
    }
}

/// An HTTP/2 frame engine driven by a [`Session`].
///
/// The multiplexer never touches the transport. It queues outbound bytes for
/// [`pending_send`](Multiplexer::pending_send) and consumes inbound bytes
/// through [`receive`](Multiplexer::receive).
pub trait Multiplexer {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Request body source kept by the multiplexer until the body is sent.
    type Body: BodySource;

    /// Queue the connection preface and initial SETTINGS.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Queue a request and return the stream id assigned to it.
    fn submit_request(
        &mut self,
        headers: &[HeaderField<'_>],
        body: Option<Self::Body>,
    ) -> Result<u32, Self::Error>;

    /// Next run of bytes to put on the wire, empty when nothing is queued.
    ///
    /// The returned bytes count as sent once this is called again.
    fn pending_send(&mut self) -> Result<&[u8], Self::Error>;

    /// Process bytes read from the peer, reporting what they decode to.
    fn receive(
        &mut self,
        input: &[u8],
        handler: &mut dyn FrameHandler,
    ) -> Result<usize, Self::Error>;

    /// Whether any stream or control exchange still needs I/O.
    fn is_active(&self) -> bool;
}

/// An HTTP/2 connection: transport, frame engine and response handler.
pub struct Session<C: Transport, M: Multiplexer, H: FrameHandler> {
    connection: Option<C>,
    multiplexer: M,
    handler: H,
    receive_buf: [u8; RECEIVE_CHUNK_LEN],
}

impl<C: Transport, M: Multiplexer, H: FrameHandler> core::fmt::Debug for Session<C, M, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.connection.is_some())
            .field("active", &self.multiplexer.is_active())
            .finish()
    }
}

impl<C: Transport, M: Multiplexer, H: FrameHandler> Session<C, M, H> {
    /// Start a session over an already connected transport.
    ///
    /// The connection preface is written before this returns. On failure the
    /// transport is closed.
    ///
    /// # Errors
    ///
    /// * [`Error::Parameter`] - the multiplexer refused to start
    /// * [`Error::Send`] - the preface could not be written
    pub fn new(connection: C, multiplexer: M, handler: H) -> Result<Self, Error> {
        let mut session = Self {
            connection: Some(connection),
            multiplexer,
            handler,
            receive_buf: [0; RECEIVE_CHUNK_LEN],
        };

        if session.multiplexer.start().is_err() {
            error!("http2 session start fail");
            return Err(Error::Parameter);
        }
        session.flush()?;
        info!("http2 session started");
        Ok(session)
    }

    /// Queue a request. Nothing is written until [`run_once`](Self::run_once).
    ///
    /// # Errors
    ///
    /// * [`Error::Parameter`] - the session is closed or the multiplexer
    ///   rejected the request
    pub fn submit_request(
        &mut self,
        headers: &[HeaderField<'_>],
        body: Option<M::Body>,
    ) -> Result<u32, Error> {
        if self.connection.is_none() {
            return Err(Error::Parameter);
        }
        let stream_id = self.multiplexer.submit_request(headers, body).map_err(|_| {
            error!("http2 submit request fail");
            Error::Parameter
        })?;
        debug!("http2 request queued on stream {}", stream_id);
        Ok(stream_id)
    }

    /// Flush queued output, then make one bounded read and feed it to the
    /// multiplexer. Returns the number of bytes received; 0 means the read
    /// timed out with nothing to process.
    ///
    /// # Errors
    ///
    /// * [`Error::Parameter`] - the session is closed
    /// * [`Error::Send`] - queued output could not be written
    /// * [`Error::TransportClosed`] - the peer closed or the read failed
    /// * [`Error::Parse`] - the multiplexer rejected the peer's frames
    pub fn run_once(&mut self) -> Result<usize, Error> {
        self.flush()?;

        let connection = self.connection.as_mut().ok_or(Error::Parameter)?;
        let n = match connection.read(&mut self.receive_buf) {
            Ok(0) => {
                error!("http2 peer closed the connection");
                return Err(Error::TransportClosed);
            }
            Ok(n) => n,
            Err(NetError::Timeout) => return Ok(0),
            Err(err) => {
                error!("http2 receive fail: {}", err);
                return Err(Error::TransportClosed);
            }
        };

        trace!("http2 received {} bytes", n);
        self.multiplexer
            .receive(&self.receive_buf[..n], &mut self.handler)
            .map_err(|_| {
                error!("http2 frame processing fail");
                Error::Parse
            })?;

        self.flush()?;
        Ok(n)
    }

    /// Call [`run_once`](Self::run_once) until the multiplexer has nothing
    /// left to do.
    pub fn run(&mut self) -> Result<(), Error> {
        while self.multiplexer.is_active() {
            self.run_once()?;
        }
        Ok(())
    }

    /// The response handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The response handler, mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// The frame engine.
    pub fn multiplexer(&self) -> &M {
        &self.multiplexer
    }

    /// Close the transport and end the session.
    pub fn close(mut self) -> Result<(), Error> {
        match self.connection.take() {
            Some(connection) => connection.close().map_err(|_| Error::TransportClosed),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<(), Error> {
        let Some(connection) = self.connection.as_mut() else {
            return Err(Error::Parameter);
        };
        loop {
            let pending = self.multiplexer.pending_send().map_err(|_| {
                error!("http2 session send fail");
                Error::Send
            })?;
            if pending.is_empty() {
                break;
            }
            trace!("http2 sending {} bytes", pending.len());
            write_all(connection, pending)?;
        }
        connection.flush().map_err(|_| Error::Send)
    }
}

impl<C: Transport, M: Multiplexer, H: FrameHandler> Drop for Session<C, M, H> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            if connection.close().is_err() {
                warn!("http2 transport close failed");
            }
        }
    }
}

#[cfg(feature = "std")]
mod connect {
    use super::*;
    use crate::network::application::http::client::open_stream;
    use crate::network::application::http::{Options, Uri, Version};
    use crate::network::Close;
    use crate::network::transport::Stream;

    impl<M: Multiplexer, H: FrameHandler> Session<Stream, M, H> {
        /// Connect to `uri` and start a session.
        ///
        /// Secure targets negotiate `h2` through ALPN whatever
        /// `options.version` says; a server that does not agree is rejected.
        /// Plain targets speak HTTP/2 with prior knowledge.
        ///
        /// # Errors
        ///
        /// * [`Error::InvalidUri`] - the URI does not parse
        /// * [`Error::Connect`] / [`Error::Secure`] - as for
        ///   [`Client::connect`](crate::network::application::http::Client::connect)
        /// * [`Error::Secure`] - the server did not select `h2`
        /// * everything [`Session::new`] reports
        pub fn connect(
            uri: &str,
            port: Option<u16>,
            options: &Options<'_>,
            multiplexer: M,
            handler: H,
        ) -> Result<Self, Error> {
            let parsed = Uri::parse(uri)?;
            let options = Options {
                version: Version::Http2,
                ..*options
            };
            let stream = open_stream(&parsed, port, &options)?;

            if stream.is_secure() && stream.alpn_protocol() != Some(b"h2".as_slice()) {
                error!("server did not negotiate h2");
                if stream.close().is_err() {
                    warn!("http2 transport close failed");
                }
                return Err(Error::Secure);
            }

            Self::new(stream, multiplexer, handler)
        }
    }
}
