//! boosterd — privileged thread priority daemon.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast;

use booster_core::config::BoosterConfig;
use booster_services::{ChannelServer, SchedThreadTable};

mod endpoint;

use endpoint::Endpoint;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = BoosterConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = BoosterConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        BoosterConfig::default()
    });

    let socket_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.endpoint.socket_path.clone());
    tracing::info!(
        socket = %socket_path.display(),
        allowed_uids = ?config.endpoint.allowed_uids,
        "boosterd starting"
    );

    let (endpoint, listener) = Endpoint::create(&socket_path, config.endpoint.mode)?;

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Serve ────────────────────────────────────────────────────────────────
    let server_task = tokio::spawn(
        ChannelServer::new(
            listener,
            Arc::new(SchedThreadTable::new()),
            config.endpoint.allowed_uids.clone(),
            shutdown_tx.subscribe(),
        )
        .run(),
    );

    // ── Wait for exit ────────────────────────────────────────────────────────
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!(socket = %endpoint.path().display(), "shutting down"),
        r = server_task        => tracing::error!("channel server exited: {:?}", r),
    }

    drop(endpoint);
    Ok(())
}
