use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use mock_server::{build_router, load_settings, state_from_settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let app = build_router(Arc::new(state_from_settings(&settings)));

    let addr: SocketAddr = settings
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind))?;
    info!(
        %addr,
        seed_count = settings.seed_count,
        fail_reads = settings.fail_reads,
        fail_writes = settings.fail_writes,
        "mock server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
