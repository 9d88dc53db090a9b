//! Connection options.

use core::time::Duration;

/// Socket send/receive timeout applied when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Protocol version the connection is set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    /// HTTP/1.1 over the transport.
    #[default]
    Http11,
    /// HTTP/2; secure connections advertise `h2` via ALPN.
    Http2,
}

/// PEM material handed to the secure transport.
///
/// The HTTP engine never looks inside these bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureMaterial<'a> {
    /// Trust anchors used to validate the server chain. Without them the
    /// bundled web PKI roots are used.
    pub root_certificate: Option<&'a [u8]>,
    /// Certificate chain presented for client authentication.
    pub client_certificate: Option<&'a [u8]>,
    /// Private key matching `client_certificate`.
    pub private_key: Option<&'a [u8]>,
}

/// Configuration for [`Client::connect`](super::Client::connect).
///
/// # Examples
///
/// ```rust
/// use core::time::Duration;
/// use libhttpc::network::application::http::{Options, Version};
///
/// let options = Options {
///     timeout: Duration::from_secs(5),
///     ..Options::default()
/// };
/// assert_eq!(options.version, Version::Http11);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Options<'a> {
    /// Protocol version to negotiate.
    pub version: Version,
    /// Bounds each connect attempt and every blocking send and receive.
    /// `Duration::ZERO` disables the socket timeouts.
    pub timeout: Duration,
    /// Certificates and key for `https://` targets.
    pub secure: Option<SecureMaterial<'a>>,
}

impl Default for Options<'_> {
    fn default() -> Self {
        Self {
            version: Version::Http11,
            timeout: DEFAULT_TIMEOUT,
            secure: None,
        }
    }
}
