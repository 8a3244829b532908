//! Upstream resolver selection.

use anyhow::bail;
use rand::seq::IndexedRandom;
use std::net::SocketAddr;

/// The configured upstream resolvers, fixed after construction.
///
/// Selection is a uniform independent draw per query rather than
/// round-robin, so short bursts carry no fairness guarantee, only the
/// expectation over many queries.
pub struct UpstreamSelector {
    servers: Vec<SocketAddr>,
}

impl UpstreamSelector {
    /// Build a selector from the configured resolver addresses.
    ///
    /// An empty list is a configuration error: the proxy cannot serve
    /// anything without somewhere to forward to.
    pub fn new(servers: Vec<SocketAddr>) -> anyhow::Result<Self> {
        if servers.is_empty() {
            bail!("no upstream resolvers configured");
        }
        Ok(Self { servers })
    }

    /// Pick one upstream uniformly at random.
    pub fn pick(&self) -> SocketAddr {
        // The list is non-empty by construction.
        *self
            .servers
            .choose(&mut rand::rng())
            .unwrap_or(&self.servers[0])
    }

    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }
}
