//! UDP transport for DNS queries.
//!
//! Connectionless: each datagram is handled on its own task, so
//! responses may leave in a different order than queries arrived.
//! Nothing ties one query's state to another's; the resolver carries
//! the shared collaborators.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{error, trace};

use crate::resolver::Resolver;

use super::MAX_DNS_PACKET_SIZE;

/// UDP transport for the DNS proxy.
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTransport {
    /// Bind the listening socket.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Start the receive loop.
    ///
    /// Spawns one task for the loop itself and one short-lived task per
    /// datagram, so a slow upstream exchange never stalls receiving.
    pub fn start(self, resolver: Arc<Resolver>) {
        tokio::spawn(run(self.socket, resolver));
    }
}

async fn run(socket: Arc<UdpSocket>, resolver: Arc<Resolver>) {
    let mut buf = [0u8; MAX_DNS_PACKET_SIZE];

    loop {
        let (len, src) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(err) => {
                error!(%err, "udp recv error");
                continue;
            }
        };

        // Anything shorter than the DNS header cannot be a query.
        if len < 12 {
            trace!(%src, len, "dropping short datagram");
            continue;
        }

        let packet = buf[..len].to_vec();
        let socket = socket.clone();
        let resolver = resolver.clone();

        tokio::spawn(async move {
            if let Some(response) = resolver.handle(&packet).await {
                if let Err(err) = socket.send_to(&response, src).await {
                    error!(%src, %err, "udp send error");
                }
            }
        });
    }
}
