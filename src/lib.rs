//! Sinkhole - a caching, blocklist-filtering DNS forwarding proxy.
//!
//! Queries arrive over UDP; blocked domains get NXDOMAIN, everything
//! else is forwarded to a randomly chosen upstream resolver and cached
//! for a fixed TTL. This library exposes the components for testing and
//! benchmarking.

pub mod cache;
pub mod config;
pub mod dns;
pub mod filter;
pub mod proxy;
pub mod resolver;
pub mod stats;
pub mod transport;
pub mod upstream;
