use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use sinkhole::config::{load_blocklist, ProxyConfig};
use sinkhole::proxy;

#[derive(Parser)]
#[command(name = "sinkhole")]
#[command(about = "Caching, blocklist-filtering DNS forwarding proxy", long_about = None)]
struct Args {
    /// Local port to listen on
    #[arg(short, long, default_value = "5353")]
    port: u16,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Upstream DNS server (host:port); repeat for multiple
    #[arg(short, long = "upstream", default_value = "8.8.8.8:53")]
    upstreams: Vec<String>,

    /// File with domains to block, one per line
    #[arg(long)]
    blocklist: Option<PathBuf>,

    /// Cache TTL in seconds, applied to every cached response
    #[arg(long, default_value = "300")]
    cache_ttl: u64,

    /// Upstream exchange timeout in milliseconds
    #[arg(long, default_value = "5000")]
    forward_timeout: u64,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ProxyConfig> {
        let bind_addr: SocketAddr = format!("{}:{}", self.bind, self.port)
            .parse()
            .context("invalid bind address")?;

        let upstreams = self
            .upstreams
            .iter()
            .map(|s| {
                s.parse()
                    .with_context(|| format!("invalid upstream address {s:?}"))
            })
            .collect::<anyhow::Result<Vec<SocketAddr>>>()?;

        // A missing or empty blocklist is allowed; the proxy then only
        // forwards and caches.
        let blocklist = match &self.blocklist {
            Some(path) => load_blocklist(path)?,
            None => {
                warn!("no blocklist file configured");
                Vec::new()
            }
        };

        Ok(ProxyConfig {
            bind_addr,
            upstreams,
            blocklist,
            cache_ttl: Duration::from_secs(self.cache_ttl),
            forward_timeout: Duration::from_millis(self.forward_timeout),
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Args::parse().into_config()?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(proxy::run(config))
}
