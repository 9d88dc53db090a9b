//! # Application Layer Protocols
//!
//! Protocol engines built on the transport traits in [`crate::network`].
//!
//! - **[`http`]**: HTTP/1.1 request/response engine
//! - **[`http2`]**: HTTP/2 session that drives an external frame multiplexer
//!
//! Both work with any type implementing [`Transport`](crate::network::Transport),
//! keep their state in fixed-size storage and report faults through
//! [`http::Error`].

/// HTTP/1.1 client.
pub mod http;

/// HTTP/2 session shell.
pub mod http2;
