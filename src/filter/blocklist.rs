//! Blocklist of domains answered with NXDOMAIN instead of forwarding.

use rustc_hash::FxHashSet;

use crate::dns::normalize;

/// An immutable set of blocked, fully-qualified domain names.
///
/// Built once at startup from configuration and never mutated after,
/// so it is shared across query tasks without synchronization.
pub struct Blocklist {
    domains: FxHashSet<String>,
}

impl Blocklist {
    /// Build a blocklist from configured domain strings.
    ///
    /// Each entry is normalized (lowercase, trailing dot) before
    /// insertion. An empty input yields a legal, empty blocklist.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| normalize(d.as_ref()))
            .collect();

        Self { domains }
    }

    /// Check whether a domain is blocked.
    ///
    /// Exact membership of the normalized name; subdomains of a blocked
    /// name are not themselves blocked unless listed.
    pub fn is_blocked(&self, domain: &str) -> bool {
        self.domains.contains(&normalize(domain))
    }

    /// Returns the number of domains in the blocklist.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Blocklist {
        Blocklist::new(["ads.example.com.", "Tracker.Example.Org", "doubleclick.net"])
    }

    #[test]
    fn is_blocked_exact_match() {
        let blocklist = sample();

        assert!(blocklist.is_blocked("ads.example.com."));
        assert!(blocklist.is_blocked("doubleclick.net."));
    }

    #[test]
    fn is_blocked_normalizes_case_and_trailing_dot() {
        let blocklist = sample();

        assert!(blocklist.is_blocked("Ads.Example.Com"));
        assert!(blocklist.is_blocked("ADS.EXAMPLE.COM."));
        assert!(blocklist.is_blocked("tracker.example.org"));
    }

    #[test]
    fn is_blocked_does_not_match_subdomains() {
        let blocklist = sample();

        assert!(!blocklist.is_blocked("deep.ads.example.com"));
        assert!(!blocklist.is_blocked("example.com"));
    }

    #[test]
    fn is_blocked_returns_false_for_unlisted_domains() {
        let blocklist = sample();

        assert!(!blocklist.is_blocked("example.org"));
        assert!(!blocklist.is_blocked(""));
    }

    #[test]
    fn empty_blocklist_is_legal() {
        let blocklist = Blocklist::new(Vec::<String>::new());

        assert!(blocklist.is_empty());
        assert!(!blocklist.is_blocked("example.com"));
    }

    #[test]
    fn duplicate_entries_collapse_to_one_key() {
        let blocklist = Blocklist::new(["example.com", "Example.Com", "example.com."]);

        assert_eq!(blocklist.len(), 1);
    }
}
