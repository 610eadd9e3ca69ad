use std::net::SocketAddr;

use anyhow::Context;
use chat_relay_rs::api::server::ChatServer;
use chat_relay_rs::helpers::build_orchestrator;
use chat_relay_rs::RelayConfig;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    // Blocking HTTP clients must be built and dropped outside the async runtime.
    let orchestrator = build_orchestrator(&config)?;
    if !orchestrator.has_providers() {
        warn!("no provider API keys configured, every reply will come from fallback mode");
    }
    let server = ChatServer::new(addr, orchestrator);

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime
        .block_on(server.start())
        .map_err(|err| anyhow::anyhow!("server error: {}", err))
}
