//! Address resolution and blocking TCP connect.

use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::network::error::Error;

/// Resolve `host` and connect to the first candidate that accepts.
///
/// IPv4 candidates are tried before IPv6 ones, each with a blocking connect
/// bounded by `timeout`. The returned stream has `timeout` applied to every
/// send and receive. A zero `timeout` means no bound at all.
///
/// # Errors
///
/// * [`Error::InvalidAddress`] - the name does not resolve
/// * [`Error::ConnectionRefused`] - no candidate accepted the connection
pub fn resolve_and_connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, Error> {
    let name = host.trim_start_matches('[').trim_end_matches(']');
    let mut candidates: Vec<SocketAddr> = (name, port)
        .to_socket_addrs()
        .map_err(|_| {
            error!("address resolution failed for {}", host);
            Error::InvalidAddress
        })?
        .collect();
    candidates.sort_by_key(|addr| !addr.is_ipv4());

    for addr in &candidates {
        let attempt = if timeout.is_zero() {
            TcpStream::connect(addr)
        } else {
            TcpStream::connect_timeout(addr, timeout)
        };
        match attempt {
            Ok(stream) => {
                info!("connected to {}:{}", host, port);
                apply_timeouts(&stream, timeout);
                return Ok(stream);
            }
            Err(_) => debug!("candidate address for {} refused", host),
        }
    }

    error!("no address of {} accepted the connection", host);
    Err(Error::ConnectionRefused)
}

fn apply_timeouts(stream: &TcpStream, timeout: Duration) {
    let timeout = (!timeout.is_zero()).then_some(timeout);
    if stream.set_write_timeout(timeout).is_err() {
        warn!("set socket send timeout fail");
    }
    if stream.set_read_timeout(timeout).is_err() {
        warn!("set socket recv timeout fail");
    }
}

/// Shut both directions down, treating an already-gone peer as success.
pub(crate) fn shutdown(stream: &TcpStream) -> Result<(), Error> {
    match stream.shutdown(Shutdown::Both) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotConnected => Ok(()),
        Err(err) => Err(err.into()),
    }
}
