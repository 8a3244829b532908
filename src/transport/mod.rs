//! Transport layer for the DNS proxy.
//!
//! Receives queries from clients over UDP and sends back the responses
//! the resolver produces. Wire parsing lives in `dns`; decisions live
//! in `resolver`.

pub mod udp;

/// Maximum size of a DNS packet (with some headroom).
pub const MAX_DNS_PACKET_SIZE: usize = 4096;
