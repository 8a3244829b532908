//! DNS response cache with TTL-based expiration.

use rustc_hash::FxHashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::dns::{normalize, rewrite_id};

struct CacheEntry {
    response: Vec<u8>,
    expires_at: Instant,
}

/// TTL-based DNS cache keyed by normalized domain name.
///
/// One table behind a readers-writer lock: concurrent fresh-hit reads
/// share the read lock, inserts and evictions take the write lock.
/// Every entry lives for the same fixed duration; the TTL carried by
/// the upstream answer's own records is deliberately ignored.
pub struct DnsCache {
    entries: RwLock<FxHashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl DnsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            ttl,
        }
    }

    /// Look up a cached response for a domain.
    ///
    /// On a fresh hit, returns an independent copy of the stored bytes
    /// with the transaction id rewritten to `query_id`; the stored entry
    /// is never handed out directly, so callers may mutate the result
    /// freely. An entry found at or past its expiry is removed on this
    /// same access and reported as a miss (lazy eviction, no sweeper).
    pub fn get(&self, domain: &str, query_id: u16) -> Option<Vec<u8>> {
        let now = Instant::now();
        let key = normalize(domain);

        {
            let Ok(entries) = self.entries.read() else {
                return None;
            };
            if let Some(entry) = entries.get(&key) {
                if now < entry.expires_at {
                    return rewrite_id(&entry.response, query_id);
                }
            } else {
                return None;
            }
        }

        // Expired: upgrade to the write lock and evict. Re-check the
        // deadline in case a concurrent put refreshed the entry.
        let Ok(mut entries) = self.entries.write() else {
            return None;
        };
        if let Some(entry) = entries.get(&key) {
            if now >= entry.expires_at {
                entries.remove(&key);
            }
        }
        None
    }

    /// Store a response for a domain, replacing any prior entry.
    ///
    /// Copies the bytes so later mutation of the caller's buffer cannot
    /// reach the cache. Expiry is `now + ttl`, last write wins.
    pub fn put(&self, domain: &str, response: &[u8]) {
        let key = normalize(domain);

        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        entries.insert(
            key,
            CacheEntry {
                response: response.to_vec(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::message_id;

    fn response_bytes(id: u16) -> Vec<u8> {
        let mut bytes = vec![0u8; 16];
        bytes[0] = (id >> 8) as u8;
        bytes[1] = (id & 0xFF) as u8;
        bytes
    }

    #[test]
    fn get_returns_fresh_entry_with_rewritten_id() {
        let cache = DnsCache::new(Duration::from_secs(60));
        cache.put("example.com.", &response_bytes(0xAAAA));

        let hit = cache.get("example.com.", 0x1234).unwrap();

        assert_eq!(message_id(&hit), Some(0x1234));
        assert_eq!(&hit[2..], &response_bytes(0xAAAA)[2..]);
    }

    #[test]
    fn get_normalizes_lookup_key() {
        let cache = DnsCache::new(Duration::from_secs(60));
        cache.put("Example.Com", &response_bytes(1));

        assert!(cache.get("example.com.", 2).is_some());
        assert!(cache.get("EXAMPLE.COM", 3).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn get_misses_on_unknown_domain() {
        let cache = DnsCache::new(Duration::from_secs(60));

        assert!(cache.get("example.com.", 1).is_none());
    }

    #[test]
    fn expired_entry_is_missed_and_evicted() {
        let cache = DnsCache::new(Duration::ZERO);
        cache.put("example.com.", &response_bytes(1));
        assert_eq!(cache.len(), 1);

        assert!(cache.get("example.com.", 2).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn sequential_gets_return_independent_copies() {
        let cache = DnsCache::new(Duration::from_secs(60));
        cache.put("example.com.", &response_bytes(0xAAAA));

        let mut first = cache.get("example.com.", 0x1111).unwrap();
        let second = cache.get("example.com.", 0x2222).unwrap();

        first[2] = 0xFF;
        assert_eq!(second[2], 0);
        let third = cache.get("example.com.", 0x3333).unwrap();
        assert_eq!(third[2], 0);
    }

    #[test]
    fn put_copies_the_callers_buffer() {
        let cache = DnsCache::new(Duration::from_secs(60));
        let mut response = response_bytes(1);
        cache.put("example.com.", &response);

        response[2] = 0xFF;

        let hit = cache.get("example.com.", 1).unwrap();
        assert_eq!(hit[2], 0);
    }

    #[test]
    fn put_overwrites_prior_entry() {
        let cache = DnsCache::new(Duration::from_secs(60));
        let mut old = response_bytes(1);
        old[2] = 1;
        let mut new = response_bytes(1);
        new[2] = 2;

        cache.put("example.com.", &old);
        cache.put("example.com.", &new);

        let hit = cache.get("example.com.", 1).unwrap();
        assert_eq!(hit[2], 2);
        assert_eq!(cache.len(), 1);
    }
}
