//! Host to IPv4 address resolution

use crate::FetchError;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::lookup_host;

/// A resolved host address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The first IPv4 address found for the host
    pub addr: Ipv4Addr,
    /// Wall-clock time spent resolving
    pub elapsed: Duration,
    /// True if the host was a dotted IPv4 literal and no lookup was made
    pub literal: bool,
}

/// Resolves `host` to a single IPv4 address
///
/// Dotted IPv4 literals are used directly. Anything else goes through the
/// system resolver and the first IPv4 result wins. No timeout is applied
/// here; the platform resolver decides when a lookup fails.
pub async fn resolve(host: &str) -> Result<Resolution, FetchError> {
    let started = Instant::now();

    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return Ok(Resolution {
            addr,
            elapsed: started.elapsed(),
            literal: true,
        });
    }

    let addrs = lookup_host((host, 0))
        .await
        .map_err(|source| FetchError::Dns {
            host: host.to_string(),
            source,
        })?;

    let addr = addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| FetchError::NoAddress {
            host: host.to_string(),
        })?;

    Ok(Resolution {
        addr,
        elapsed: started.elapsed(),
        literal: false,
    })
}
