//! rustls client setup.
//!
//! The handshake and record layer belong to rustls. This module only turns the
//! caller's PEM material into a `ClientConfig` and drives the handshake to
//! completion over an already connected socket.

use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use crate::network::application::http::{SecureMaterial, Version};
use crate::network::error::Error;

/// A TCP socket wrapped in a rustls client session.
pub type TlsStream = StreamOwned<ClientConnection, TcpStream>;

/// Build a client configuration from optional PEM material.
///
/// Root certificates replace the bundled web PKI roots when given. A client
/// certificate and private key must come together. HTTP/2 advertises `h2`
/// ahead of `http/1.1` through ALPN.
///
/// # Errors
///
/// [`Error::TlsError`] if any PEM block fails to parse, a root is rejected,
/// or only half of the client credentials are present.
pub fn client_config(
    material: Option<&SecureMaterial<'_>>,
    version: Version,
) -> Result<Arc<ClientConfig>, Error> {
    let material = material.copied().unwrap_or_default();

    let mut roots = RootCertStore::empty();
    match material.root_certificate {
        Some(pem) => {
            for cert in CertificateDer::pem_slice_iter(pem) {
                let cert = cert.map_err(|_| {
                    error!("x509 root certificate parse fail");
                    Error::TlsError
                })?;
                roots.add(cert).map_err(|_| {
                    error!("root certificate rejected");
                    Error::TlsError
                })?;
            }
            if roots.is_empty() {
                error!("no certificate found in root material");
                return Err(Error::TlsError);
            }
        }
        None => roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned()),
    }

    let builder = ClientConfig::builder().with_root_certificates(roots);
    let mut config = match (material.client_certificate, material.private_key) {
        (Some(cert_pem), Some(key_pem)) => {
            let chain = CertificateDer::pem_slice_iter(cert_pem)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| {
                    error!("client certificate parse fail");
                    Error::TlsError
                })?;
            let key = PrivateKeyDer::from_pem_slice(key_pem).map_err(|_| {
                error!("pk parse key fail");
                Error::TlsError
            })?;
            builder.with_client_auth_cert(chain, key).map_err(|_| {
                error!("client certificate and key do not match");
                Error::TlsError
            })?
        }
        (None, None) => builder.with_no_client_auth(),
        _ => {
            error!("client authentication needs both certificate and key");
            return Err(Error::TlsError);
        }
    };

    if version == Version::Http2 {
        config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    }

    Ok(Arc::new(config))
}

/// Run the client handshake for `host` over `tcp`.
///
/// # Errors
///
/// * [`Error::InvalidAddress`] - `host` is not a valid server name
/// * [`Error::TlsError`] - the handshake failed or the peer was not trusted
pub fn connect(tcp: TcpStream, host: &str, config: Arc<ClientConfig>) -> Result<TlsStream, Error> {
    let name = host.trim_start_matches('[').trim_end_matches(']');
    let server_name = ServerName::try_from(name.to_owned()).map_err(|_| {
        error!("invalid tls server name {}", host);
        Error::InvalidAddress
    })?;

    let mut session = ClientConnection::new(config, server_name).map_err(|_| {
        error!("tls session setup fail");
        Error::TlsError
    })?;

    let mut tcp = tcp;
    while session.is_handshaking() {
        if session.complete_io(&mut tcp).is_err() {
            error!("tls handshake with {} failed", host);
            return Err(Error::TlsError);
        }
    }
    let suite = session
        .negotiated_cipher_suite()
        .and_then(|suite| suite.suite().as_str())
        .unwrap_or("unknown");
    info!("tls handshake with {} succeeded, cipher suite {}", host, suite);

    Ok(StreamOwned::new(session, tcp))
}

/// Send close_notify and shut the socket down.
pub(crate) fn close(mut stream: TlsStream) -> Result<(), Error> {
    stream.conn.send_close_notify();
    if stream.conn.complete_io(&mut stream.sock).is_err() {
        debug!("close_notify not delivered");
    }
    super::tcp::shutdown(&stream.sock)
}
