//! Proxy orchestration.
//!
//! Builds the collaborators from configuration, binds the transport and
//! runs until killed.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::cache::DnsCache;
use crate::config::ProxyConfig;
use crate::filter::Blocklist;
use crate::resolver::Resolver;
use crate::transport::udp::UdpTransport;
use crate::upstream::UpstreamSelector;

/// Run the DNS proxy with the given configuration.
///
/// Fatal only for configuration-level problems (empty upstream list,
/// unbindable address); once serving, per-query errors never surface
/// here.
pub async fn run(config: ProxyConfig) -> anyhow::Result<()> {
    let blocklist = Blocklist::new(&config.blocklist);
    if blocklist.is_empty() {
        warn!("blocklist is empty, no domains will be filtered");
    }

    let upstreams = UpstreamSelector::new(config.upstreams)?;
    let upstream_strs: Vec<_> = upstreams.servers().iter().map(|a| a.to_string()).collect();
    info!(upstreams = %upstream_strs.join(", "), "forwarding to upstream resolvers");

    let cache = DnsCache::new(config.cache_ttl);
    let resolver = Arc::new(Resolver::new(
        cache,
        blocklist,
        upstreams,
        config.forward_timeout,
    ));

    let udp = UdpTransport::bind(config.bind_addr).await?;
    let bound = udp.local_addr()?;
    info!(
        bind = %bound,
        blocked_domains = resolver.blocked_count(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "dns proxy listening"
    );

    udp.start(resolver.clone());

    // Stats summary once a minute
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.tick().await; // skip the immediate first tick
        loop {
            interval.tick().await;
            let stats = resolver.stats_snapshot_and_reset();
            info!(
                cache = resolver.cache_len(),
                requests = stats.requests,
                cached = stats.cached,
                blocked = stats.blocked,
                forwarded = stats.forwarded,
                failed = stats.failed,
                avg_handle_ms = format_args!("{:.2}", stats.avg_handle_ms),
                "stats"
            );
        }
    });

    // Serve until the process is killed
    std::future::pending::<()>().await;

    Ok(())
}
