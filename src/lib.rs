//! # libhttpc - small blocking HTTP client engine
//!
//! An HTTP/1.1 client for devices that cannot afford a general-purpose HTTP
//! stack. One handle runs one transaction: the caller composes the request
//! header into a fixed buffer it owns, the engine sends it and parses the
//! response header back into the same buffer, and the body is streamed out in
//! caller-sized pieces, decoded from `chunked` framing when asked.
//!
//! ## Features
//!
//! - **HTTP/1.1 client**: caller-composed requests, `Content-Length` and
//!   `chunked` responses, case-insensitive header lookup
//! - **Transport agnostic**: the engine drives anything implementing the
//!   [`network`] traits, so it runs over vendor TCP stacks on `no_std`
//! - **TCP and TLS**: `std` brings a resolver and connector, `tls` wraps it in
//!   rustls
//! - **HTTP/2 session**: drives an external frame engine over the same
//!   transports
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libhttpc = "0.1.0"
//! ```
//!
//! ### Basic HTTP Client Example
//!
//! ```rust,no_run
//! use libhttpc::network::application::http::{Client, Method, Mode};
//! # use libhttpc::network::error::Error as NetError;
//! # struct MockConnection;
//! # impl libhttpc::network::Connection for MockConnection {}
//! # impl libhttpc::network::Read for MockConnection {
//! #     type Error = NetError;
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl libhttpc::network::Write for MockConnection {
//! #     type Error = NetError;
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl libhttpc::network::Close for MockConnection {
//! #     type Error = NetError;
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! # fn main() -> Result<(), libhttpc::network::application::http::Error> {
//! let mut storage = [0u8; 512];
//! let mut client = Client::new("http://device.local/api/data", MockConnection, &mut storage)?;
//!
//! let header = client.header_mut();
//! header.request_line(Method::Get, "/api/data")?;
//! header.field("Host", "device.local")?;
//! header.end_headers()?;
//!
//! let status = client.send_request(None)?;
//! let mut chunk = [0u8; 256];
//! while client.receive_response(Mode::Normal, &mut chunk)? > 0 {}
//! # let _ = status;
//! # Ok(())
//! # }
//! ```
//!
//! ## Optional Features
//!
//! - `std` (default): TCP connector, socket timeouts, `std::error::Error`
//! - `tls`: rustls secure transport for `https://`
//! - `log` (default): log through the `log` crate
//! - `defmt`: log through `defmt` and derive `defmt::Format` on errors

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Transport traits, transports and the protocol engines built on them.
pub mod network;
