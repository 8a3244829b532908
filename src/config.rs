//! Startup configuration for the proxy.
//!
//! Everything here is resolved once before serving begins; the running
//! proxy never re-reads configuration.

use anyhow::Context;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Resolved configuration for one proxy instance.
pub struct ProxyConfig {
    /// Local address to bind (e.g. 127.0.0.1:5353).
    pub bind_addr: SocketAddr,
    /// Upstream resolver addresses; must be non-empty.
    pub upstreams: Vec<SocketAddr>,
    /// Domains to answer with NXDOMAIN. May be empty.
    pub blocklist: Vec<String>,
    /// Fixed lifetime for every cache entry.
    pub cache_ttl: Duration,
    /// Deadline for a single upstream exchange.
    pub forward_timeout: Duration,
}

/// Read a blocklist file: one domain per line, `#` comments and blank
/// lines ignored.
pub fn load_blocklist(path: &Path) -> anyhow::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading blocklist file {}", path.display()))?;
    Ok(parse_blocklist(&contents))
}

fn parse_blocklist(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            Some(line.to_string())
        })
        .collect()
}
