//! HTTP/1.1 client handle.
//!
//! A [`Client`] runs exactly one request/response transaction over one
//! transport. The caller composes the request header into the
//! [`HeaderBuffer`], [`send_request`](Client::send_request) ships it (plus an
//! optional body) and parses the response header back into the same buffer,
//! and [`receive_response`](Client::receive_response) drains the body. There
//! is no keep-alive: once torn down, a handle cannot be revived.

use heapless::String;

use super::body::{BodyReader, Mode};
use super::buffer::HeaderBuffer;
use super::error::Error;
use super::response::{Headers, ResponseHead, read_head};
use super::uri::Uri;
use crate::network::Transport;

/// Longest host (authority) a handle can hold.
pub const MAX_HOST_LEN: usize = 256;
/// Longest path a handle can hold.
pub const MAX_PATH_LEN: usize = 1024;

/// Lifecycle of a [`Client`].
///
/// Resolution, connect and the TLS handshake all happen inside construction,
/// so a handle is first observed as `Connected` or `Secured`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Plain transport is up.
    Connected,
    /// Secure transport is up.
    Secured,
    /// The request went out; the response header is being read.
    RequestSent,
    /// Status and framing are known; no body read yet.
    HeadersReceived,
    /// At least one body read has been made.
    BodyStreaming,
    /// Torn down. Terminal.
    Closed,
}

/// A single-transaction HTTP/1.1 client.
///
/// # Type Parameters
///
/// * `'b` - lifetime of the caller's header storage
/// * `C` - the transport
///
/// # Examples
///
/// ```rust,no_run
/// use libhttpc::network::application::http::{Client, Method, Mode};
/// # use libhttpc::network::error::Error as NetError;
/// # struct Peer;
/// # impl libhttpc::network::Connection for Peer {}
/// # impl libhttpc::network::Read for Peer {
/// #     type Error = NetError;
/// #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
/// # }
/// # impl libhttpc::network::Write for Peer {
/// #     type Error = NetError;
/// #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
/// #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # impl libhttpc::network::Close for Peer {
/// #     type Error = NetError;
/// #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # fn main() -> Result<(), libhttpc::network::application::http::Error> {
/// let mut storage = [0u8; 1024];
/// let mut client = Client::new("http://example.com/status", Peer, &mut storage)?;
///
/// let path = client.path().clone();
/// let host = client.host().clone();
/// let header = client.header_mut();
/// header.request_line(Method::Get, &path)?;
/// header.field("Host", &host)?;
/// header.end_headers()?;
///
/// let status = client.send_request(None)?;
/// let mut body = [0u8; 512];
/// while client.receive_response(Mode::Normal, &mut body)? > 0 {}
/// client.close()?;
/// # let _ = status;
/// # Ok(())
/// # }
/// ```
pub struct Client<'b, C: Transport> {
    host: String<MAX_HOST_LEN>,
    path: String<MAX_PATH_LEN>,
    secure: bool,
    connection: Option<C>,
    header: HeaderBuffer<'b>,
    head: Option<ResponseHead>,
    body: Option<BodyReader>,
    state: State,
}

impl<C: Transport> core::fmt::Debug for Client<'_, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("state", &self.state)
            .field("header_used", &self.header.used())
            .field("head", &self.head)
            .finish()
    }
}

/// Host and path copied out of a URI into fixed storage.
pub(crate) fn owned_target(
    uri: &Uri<'_>,
) -> Result<(String<MAX_HOST_LEN>, String<MAX_PATH_LEN>), Error> {
    let host = String::try_from(uri.authority).map_err(|_| {
        error!("host does not fit in {} bytes", MAX_HOST_LEN);
        Error::Memory
    })?;
    let path = String::try_from(uri.path).map_err(|_| {
        error!("path does not fit in {} bytes", MAX_PATH_LEN);
        Error::Memory
    })?;
    debug!("host: {}, path: {}", uri.authority, uri.path);
    Ok((host, path))
}

impl<'b, C: Transport> Client<'b, C> {
    /// Wrap an already connected (and, for `https://`, already secured)
    /// transport.
    ///
    /// Construction is all-or-nothing: on failure `connection` is closed
    /// before the error is returned.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidUri`] - unrecognised scheme or empty host
    /// * [`Error::Memory`] - host or path too long
    pub fn new(uri: &str, connection: C, storage: &'b mut [u8]) -> Result<Self, Error> {
        let target = Uri::parse(uri).and_then(|uri| owned_target(&uri).map(|t| (uri.scheme, t)));
        match target {
            Ok((scheme, (host, path))) => Ok(Self::from_parts(
                host,
                path,
                scheme.is_secure(),
                connection,
                HeaderBuffer::new(storage),
            )),
            Err(err) => {
                if connection.close().is_err() {
                    warn!("closing transport after failed init also failed");
                }
                Err(err)
            }
        }
    }

    pub(crate) fn from_parts(
        host: String<MAX_HOST_LEN>,
        path: String<MAX_PATH_LEN>,
        secure: bool,
        connection: C,
        header: HeaderBuffer<'b>,
    ) -> Self {
        Self {
            host,
            path,
            secure,
            connection: Some(connection),
            header,
            head: None,
            body: None,
            state: if secure { State::Secured } else { State::Connected },
        }
    }

    /// Host (with any `:port`) from the URI.
    pub fn host(&self) -> &String<MAX_HOST_LEN> {
        &self.host
    }

    /// Path from the URI, `/` when it had none.
    pub fn path(&self) -> &String<MAX_PATH_LEN> {
        &self.path
    }

    /// Whether the URI scheme required a secure transport.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// The header buffer, for composing the request.
    pub fn header_mut(&mut self) -> &mut HeaderBuffer<'b> {
        &mut self.header
    }

    /// The header buffer: the composed request before sending, the captured
    /// NUL-separated response lines afterwards.
    pub fn header(&self) -> &HeaderBuffer<'b> {
        &self.header
    }

    /// Send the composed header, then `body` if given, then read and parse the
    /// response header. Returns the status code.
    ///
    /// Any failure after the arguments are validated tears the handle down.
    ///
    /// # Errors
    ///
    /// * [`Error::Parameter`] - nothing composed, or the handle already sent
    ///   a request or was torn down
    /// * [`Error::Send`] - the transport refused the header or body
    /// * [`Error::Parse`] - malformed status line or no transfer length
    /// * [`Error::TransportClosed`] / [`Error::Timeout`] - while reading the
    ///   response header
    pub fn send_request(&mut self, body: Option<&[u8]>) -> Result<u16, Error> {
        if !matches!(self.state, State::Connected | State::Secured) {
            error!("request already sent or handle closed");
            return Err(Error::Parameter);
        }
        if self.header.used() == 0 {
            error!("no request header composed");
            return Err(Error::Parameter);
        }

        match self.transact(body) {
            Ok(status) => Ok(status),
            Err(err) => {
                error!("http transaction failed: {}", err);
                self.teardown();
                Err(err)
            }
        }
    }

    fn transact(&mut self, body: Option<&[u8]>) -> Result<u16, Error> {
        let connection = self.connection.as_mut().ok_or(Error::Parameter)?;

        debug!("http request header: {} bytes", self.header.used());
        write_all(connection, self.header.as_bytes())?;
        if let Some(body) = body {
            debug!("http request data: {} bytes", body.len());
            write_all(connection, body)?;
        }
        connection.flush().map_err(|err| {
            error!("flush failed: {}", err);
            Error::Send
        })?;
        self.state = State::RequestSent;

        let head = read_head(connection, &mut self.header)?;
        let status = head.status;
        info!("response status {}", status);

        self.body = Some(BodyReader::new(head.framing));
        self.head = Some(head);
        self.state = State::HeadersReceived;
        Ok(status)
    }

    /// Parsed response metadata, once the header has been received.
    pub fn response(&self) -> Option<&ResponseHead> {
        self.head.as_ref()
    }

    /// Response status code.
    pub fn status(&self) -> Option<u16> {
        self.head.as_ref().map(|head| head.status)
    }

    /// Response content length, when that is the active mechanism.
    pub fn content_length(&self) -> Option<usize> {
        self.head.as_ref().and_then(ResponseHead::content_length)
    }

    /// Whether the response body is chunked.
    pub fn is_chunked(&self) -> bool {
        self.head.as_ref().is_some_and(ResponseHead::is_chunked)
    }

    /// Indexed view over the captured response header lines.
    pub fn headers(&self) -> Option<Headers<'_>> {
        self.head.as_ref().map(|head| head.headers(&self.header))
    }

    /// Value of a response header field, matched case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers()?.get(name)
    }

    /// Read the next piece of the response body into `buf`.
    ///
    /// `Ok(0)` marks the end of the body. See [`BodyReader::read`] for what
    /// each mode does.
    ///
    /// # Errors
    ///
    /// * [`Error::Parameter`] - no response header yet, handle torn down, or
    ///   `buf` is empty
    /// * everything [`BodyReader::read`] reports
    pub fn receive_response(&mut self, mode: Mode, buf: &mut [u8]) -> Result<usize, Error> {
        if !matches!(self.state, State::HeadersReceived | State::BodyStreaming) {
            error!("no response header to read a body for");
            return Err(Error::Parameter);
        }
        let (Some(connection), Some(body)) = (self.connection.as_mut(), self.body.as_mut()) else {
            return Err(Error::Parameter);
        };

        let n = body.read(connection, mode, buf)?;
        self.state = State::BodyStreaming;
        Ok(n)
    }

    /// Release the transport and end the handle.
    ///
    /// # Errors
    ///
    /// [`Error::TransportClosed`] if the transport reported a failure while
    /// closing. The handle is gone either way.
    pub fn close(mut self) -> Result<(), Error> {
        match self.release() {
            Some(Err(())) => Err(Error::TransportClosed),
            _ => Ok(()),
        }
    }

    fn teardown(&mut self) {
        if let Some(Err(())) = self.release() {
            warn!("transport close failed during teardown");
        }
    }

    fn release(&mut self) -> Option<Result<(), ()>> {
        let connection = self.connection.take()?;
        self.state = State::Closed;
        self.body = None;
        self.host.clear();
        self.path.clear();
        debug!("http client torn down");
        Some(connection.close().map_err(|_| ()))
    }
}

impl<C: Transport> Drop for Client<'_, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Write all of `data`, looping over short writes.
pub(crate) fn write_all<C: Transport>(connection: &mut C, mut data: &[u8]) -> Result<(), Error> {
    while !data.is_empty() {
        match connection.write(data) {
            Ok(0) => {
                error!("transport accepted no bytes");
                return Err(Error::Send);
            }
            Ok(n) => data = &data[n..],
            Err(err) => {
                error!("http send fail: {}", err);
                return Err(Error::Send);
            }
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
pub(crate) use connect::open_stream;

#[cfg(feature = "std")]
mod connect {
    use super::*;
    use crate::network::application::http::{Options, Version};
    use crate::network::transport::{Stream, tcp};

    impl<'b> Client<'b, Stream> {
        /// Resolve, connect and, for `https://`, secure a transport, then build
        /// a handle over it.
        ///
        /// `port` overrides the URI's port; without either the scheme default
        /// is used. Every resource acquired before a failure is released
        /// before the error is returned.
        ///
        /// # Errors
        ///
        /// * [`Error::Parameter`] - `options` asks for HTTP/2, which this
        ///   handle cannot speak; use a
        ///   [`Session`](crate::network::application::http2::Session) instead
        /// * [`Error::InvalidUri`] / [`Error::Memory`] - as for [`Client::new`]
        /// * [`Error::Connect`] - resolution failed or nothing accepted
        /// * [`Error::Secure`] - TLS setup or handshake failed, or the `tls`
        ///   feature is disabled
        pub fn connect(
            uri: &str,
            port: Option<u16>,
            storage: &'b mut [u8],
            options: &Options<'_>,
        ) -> Result<Self, Error> {
            if options.version != Version::Http11 {
                error!("http/1.1 client can not negotiate http/2");
                return Err(Error::Parameter);
            }
            let parsed = Uri::parse(uri)?;
            let (host, path) = owned_target(&parsed)?;
            let stream = open_stream(&parsed, port, options)?;

            Ok(Self::from_parts(
                host,
                path,
                parsed.scheme.is_secure(),
                stream,
                HeaderBuffer::new(storage),
            ))
        }
    }

    /// Connect to the target of `uri` and secure the stream when the scheme
    /// asks for it.
    pub(crate) fn open_stream(
        uri: &Uri<'_>,
        port: Option<u16>,
        options: &Options<'_>,
    ) -> Result<Stream, Error> {
        let port = uri.effective_port(port);
        let socket = tcp::resolve_and_connect(uri.host(), port, options.timeout).map_err(|_| {
            error!("http client connect fail");
            Error::Connect
        })?;

        if uri.scheme.is_secure() {
            secure(socket, uri.host(), options)
        } else {
            Ok(Stream::Plain(socket))
        }
    }

    #[cfg(feature = "tls")]
    fn secure(
        socket: std::net::TcpStream,
        host: &str,
        options: &Options<'_>,
    ) -> Result<Stream, Error> {
        use crate::network::transport::tls;

        let config = tls::client_config(options.secure.as_ref(), options.version)
            .map_err(|_| Error::Secure)?;
        let secured = tls::connect(socket, host, config).map_err(|_| Error::Secure)?;
        Ok(Stream::Secure(Box::new(secured)))
    }

    #[cfg(not(feature = "tls"))]
    fn secure(
        socket: std::net::TcpStream,
        _host: &str,
        _options: &Options<'_>,
    ) -> Result<Stream, Error> {
        error!("https requested but the tls feature is disabled");
        drop(socket);
        Err(Error::Secure)
    }
}
