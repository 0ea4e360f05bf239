//! snapkv server binary
//!
//! Restores the newest snapshot, serves the HTTP API, and on Ctrl-C stops
//! accepting requests and writes a final snapshot before exiting.

use anyhow::Context;
use snapkv_engine::KvService;
use snapkv_server::{build_cli, router, ServerArgs};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = ServerArgs::from_matches(&build_cli().get_matches());
    let service = KvService::open(args.store_config())
        .await
        .context("failed to start store")?;
    info!(target: "snapkv::store", restore = ?service.restore_status(), "Store ready");

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(target: "snapkv::http", %addr, "Listening");

    axum::serve(listener, router(service.handle()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let stats = service.shutdown().await.context("failed to stop store")?;
    info!(
        target: "snapkv::store",
        written = stats.written,
        deleted = stats.deleted,
        "Shutdown complete"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(target: "snapkv::http", error = %e, "Cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!(target: "snapkv::http", "Shutdown signal received");
}
