//! URI parsing for the two schemes the client understands.

use super::error::Error;

/// URI scheme. Decides whether the connector wraps the socket in TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `http://`
    Http,
    /// `https://`
    Https,
}

impl Scheme {
    /// Whether this scheme requires a secure transport.
    pub fn is_secure(&self) -> bool {
        matches!(self, Scheme::Https)
    }

    /// Port used when neither the caller nor the URI names one.
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Scheme::Http => "http://",
            Scheme::Https => "https://",
        }
    }
}

/// A parsed request target, borrowing from the input string.
///
/// For `https://github.com/foo/bar` the scheme is [`Scheme::Https`], the
/// authority is `github.com` and the path is `/foo/bar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uri<'a> {
    /// The scheme named by the prefix.
    pub scheme: Scheme,
    /// Everything between the prefix and the first `/`, including any `:port`.
    pub authority: &'a str,
    /// Everything from the first `/` onward; `/` when the URI has none.
    pub path: &'a str,
}

impl<'a> Uri<'a> {
    /// Split `uri` into scheme, authority and path.
    ///
    /// Only the literal prefixes `http://` and `https://` are recognised.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUri`] for any other prefix or an empty authority.
    pub fn parse(uri: &'a str) -> Result<Self, Error> {
        let (scheme, rest) = [Scheme::Http, Scheme::Https]
            .into_iter()
            .find_map(|scheme| uri.strip_prefix(scheme.prefix()).map(|rest| (scheme, rest)))
            .ok_or_else(|| {
                error!("unknown uri scheme");
                Error::InvalidUri
            })?;

        let (authority, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, "/"),
        };

        if authority.is_empty() {
            error!("uri has no host");
            return Err(Error::InvalidUri);
        }

        Ok(Self {
            scheme,
            authority,
            path,
        })
    }

    /// The host name, without any `:port` suffix.
    pub fn host(&self) -> &'a str {
        match self.split_port() {
            Some((host, _)) => host,
            None => self.authority,
        }
    }

    /// The port written in the authority, if any.
    pub fn port(&self) -> Option<u16> {
        self.split_port().and_then(|(_, port)| port.parse().ok())
    }

    /// Port to connect to: `explicit` if given, else the URI's, else the
    /// scheme default.
    pub fn effective_port(&self, explicit: Option<u16>) -> u16 {
        explicit
            .or_else(|| self.port())
            .unwrap_or_else(|| self.scheme.default_port())
    }

    fn split_port(&self) -> Option<(&'a str, &'a str)> {
        // Bracketed IPv6 literals carry colons of their own.
        if self.authority.starts_with('[') {
            let close = self.authority.find(']')?;
            let rest = &self.authority[close + 1..];
            return rest
                .strip_prefix(':')
                .map(|port| (&self.authority[..=close], port));
        }
        let (host, port) = self.authority.rsplit_once(':')?;
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some((host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_host_and_path() {
        let uri = Uri::parse("http://example.com/a/b?c=d").unwrap();
        assert_eq!(uri.scheme, Scheme::Http);
        assert_eq!(uri.host(), "example.com");
        assert_eq!(uri.path, "/a/b?c=d");
    }

    #[test]
    fn missing_path_defaults_to_root() {
        let uri = Uri::parse("https://example.com").unwrap();
        assert_eq!(uri.scheme, Scheme::Https);
        assert_eq!(uri.authority, "example.com");
        assert_eq!(uri.path, "/");
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(Uri::parse("ftp://example.com/"), Err(Error::InvalidUri));
        assert_eq!(Uri::parse("example.com/x"), Err(Error::InvalidUri));
        assert_eq!(Uri::parse("HTTP://example.com/"), Err(Error::InvalidUri));
        assert_eq!(Uri::parse("http:/"), Err(Error::InvalidUri));
    }

    #[test]
    fn rejects_empty_host() {
        assert_eq!(Uri::parse("http:///path"), Err(Error::InvalidUri));
        assert_eq!(Uri::parse("https://"), Err(Error::InvalidUri));
    }

    #[test]
    fn port_resolution_order() {
        let uri = Uri::parse("http://localhost:8080/x").unwrap();
        assert_eq!(uri.host(), "localhost");
        assert_eq!(uri.port(), Some(8080));
        assert_eq!(uri.effective_port(None), 8080);
        assert_eq!(uri.effective_port(Some(9000)), 9000);

        let uri = Uri::parse("https://example.com/").unwrap();
        assert_eq!(uri.port(), None);
        assert_eq!(uri.effective_port(None), 443);
    }

    #[test]
    fn ipv6_literal() {
        let uri = Uri::parse("http://[::1]:8080/").unwrap();
        assert_eq!(uri.host(), "[::1]");
        assert_eq!(uri.port(), Some(8080));

        let uri = Uri::parse("http://[::1]/").unwrap();
        assert_eq!(uri.host(), "[::1]");
        assert_eq!(uri.port(), None);
    }
}
