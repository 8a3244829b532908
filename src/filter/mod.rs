//! DNS query filtering.
//!
//! Queries for listed domains are answered with NXDOMAIN instead of
//! being forwarded upstream.

mod blocklist;

pub use blocklist::Blocklist;
