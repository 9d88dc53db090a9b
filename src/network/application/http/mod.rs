//! HTTP/1.1 client engine for constrained targets.
//!
//! The engine runs a single request/response transaction over any
//! [`Transport`](crate::network::Transport). Memory is bounded up front: the
//! caller hands over one byte region that first holds the composed request
//! header and then the captured response header, and the response body is
//! streamed into caller buffers piece by piece.
//!
//! # Features
//!
//! - The caller writes the request header; the engine adds nothing
//! - `Content-Length` and `chunked` response bodies
//! - Case-insensitive header lookup over an index of captured lines
//! - Plain TCP or rustls-secured transport with the `std` / `tls` features
//!
//! # Usage
//!
//! ```rust,no_run
//! use libhttpc::network::application::http::{Client, Method, Mode, Options};
//!
//! # fn main() -> Result<(), libhttpc::network::application::http::Error> {
//! let mut storage = [0u8; 2048];
//! let mut client = Client::connect(
//!     "http://example.com/index.html",
//!     None,
//!     &mut storage,
//!     &Options::default(),
//! )?;
//!
//! let (host, path) = (client.host().clone(), client.path().clone());
//! let header = client.header_mut();
//! header.request_line(Method::Get, &path)?;
//! header.field("Host", &host)?;
//! header.field("Connection", "close")?;
//! header.end_headers()?;
//!
//! let status = client.send_request(None)?;
//! let mode = if client.is_chunked() { Mode::Chunked } else { Mode::Normal };
//! let mut body = [0u8; 1024];
//! loop {
//!     let n = client.receive_response(mode, &mut body)?;
//!     if n == 0 {
//!         break;
//!     }
//! }
//! client.close()?;
//! # let _ = status;
//! # Ok(())
//! # }
//! ```

/// Body reader for both transfer-length mechanisms.
pub mod body;

/// Fixed-capacity header buffer and request composition helpers.
pub mod buffer;

/// Client handle and its lifecycle.
pub mod client;

/// HTTP error taxonomy.
pub mod error;

/// CRLF line reader.
pub mod line;

/// Connection options.
pub mod options;

/// Status line and header field parsing.
pub mod response;

/// `http://` / `https://` URI splitting.
pub mod uri;

pub use body::{BodyReader, CHUNK_SIZE_LINE_LEN, Mode};
pub use buffer::{HeaderBuffer, Method};
pub use client::{Client, MAX_HOST_LEN, MAX_PATH_LEN, State};
pub use error::Error;
pub use line::{Line, read_line};
pub use options::{DEFAULT_TIMEOUT, Options, SecureMaterial, Version};
pub use response::{Framing, Headers, MAX_HEADER_LINES, ResponseHead, read_head};
pub use uri::{Scheme, Uri};
