//! DNS query resolution pipeline.
//!
//! One call per inbound query: cache lookup first, then blocklist,
//! then a single forward to one randomly chosen upstream. Every
//! parseable query produces exactly one response; forward failures
//! become NXDOMAIN rather than silence.

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::cache::DnsCache;
use crate::dns::{self, DnsQuery};
use crate::filter::Blocklist;
use crate::stats::{Outcome, Stats, StatsSnapshot};
use crate::transport::MAX_DNS_PACKET_SIZE;
use crate::upstream::UpstreamSelector;

/// Resolver owns the shared collaborators and handles one query at a
/// time.
///
/// It keeps no per-query state, so a single instance is shared via
/// `Arc` across all datagram tasks; the cache carries the only lock.
pub struct Resolver {
    cache: DnsCache,
    blocklist: Blocklist,
    upstreams: UpstreamSelector,
    forward_timeout: Duration,
    stats: Stats,
}

impl Resolver {
    pub fn new(
        cache: DnsCache,
        blocklist: Blocklist,
        upstreams: UpstreamSelector,
        forward_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            blocklist,
            upstreams,
            forward_timeout,
            stats: Stats::new(),
        }
    }

    /// Handle one inbound query packet and produce the response bytes.
    ///
    /// Returns `None` only for packets that do not parse as a query;
    /// the transport drops those without replying. The cache is
    /// consulted before the blocklist, so a domain blocked after being
    /// cached keeps serving from cache until its entry expires.
    pub async fn handle(&self, packet: &[u8]) -> Option<Vec<u8>> {
        let query = DnsQuery::parse(packet)?;
        let start = Instant::now();

        if let Some(cached) = self.cache.get(&query.domain, query.id) {
            debug!(domain = %query.domain, "cache hit");
            self.stats.record(Outcome::Cached, start.elapsed());
            return Some(cached);
        }

        if self.blocklist.is_blocked(&query.domain) {
            debug!(domain = %query.domain, "blocked");
            self.stats.record(Outcome::Blocked, start.elapsed());
            return Some(query.negative_response().to_bytes());
        }

        let upstream = self.upstreams.pick();
        match exchange(packet, &query, upstream, self.forward_timeout).await {
            Ok(reply) => {
                self.cache.put(&query.domain, &reply);
                let response = dns::rewrite_id(&reply, query.id);
                debug!(domain = %query.domain, %upstream, "forwarded");
                self.stats.record(Outcome::Forwarded, start.elapsed());
                response
            }
            Err(err) => {
                warn!(domain = %query.domain, %upstream, error = %err, "forward failed");
                self.stats.record(Outcome::Failed, start.elapsed());
                Some(query.negative_response().to_bytes())
            }
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.blocklist.len()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn stats_snapshot_and_reset(&self) -> StatsSnapshot {
        self.stats.snapshot_and_reset()
    }
}

/// Synchronous exchange of one query with one upstream resolver.
///
/// A fresh ephemeral socket per exchange keeps concurrent queries off
/// each other's wire state. No retry against another upstream: a
/// timeout, transport error, or unusable reply is the caller's failure
/// to absorb.
async fn exchange(
    packet: &[u8],
    query: &DnsQuery,
    upstream: SocketAddr,
    deadline: Duration,
) -> io::Result<Vec<u8>> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(upstream).await?;
    socket.send(packet).await?;

    let mut buf = [0u8; MAX_DNS_PACKET_SIZE];
    let len = timeout(deadline, socket.recv(&mut buf))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "upstream timed out"))??;

    if len < 12 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "short reply from upstream",
        ));
    }
    if dns::message_id(&buf[..len]) != Some(query.id) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "reply id does not match query",
        ));
    }

    Ok(buf[..len].to_vec())
}
