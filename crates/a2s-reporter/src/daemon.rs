//! Process lifecycle: build the engine, serve `/metrics`, shut down.

use std::sync::Arc;
use std::time::Duration;

use a2s_engine::Reporter;
use a2s_metrics::MetricStore;
use a2s_query::A2sClient;
use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::Config;
use crate::exporter::build_router;

/// How long the engine may take to drain after the server stops.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Run the reporter until Ctrl-C or SIGTERM.
///
/// Errors returned here are startup failures: invalid configuration, an
/// unusable target, or an unbindable listen port.
pub async fn run(config: Config) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    // ── Initialize subsystems ──────────────────────────────────

    let client = A2sClient::connect(config.client_config())
        .await
        .with_context(|| {
            format!(
                "failed to create A2S client for {}:{}",
                config.game_address, config.game_port
            )
        })?;

    let store = Arc::new(MetricStore::new());
    let reporter = Reporter::new(Arc::new(client), store.clone(), config.poller_config());

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics endpoint on {addr}"))?;

    // ── Start background tasks ─────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine = reporter.spawn(shutdown_rx);

    // ── Serve /metrics ─────────────────────────────────────────

    info!(%addr, "metrics endpoint listening");
    axum::serve(listener, build_router(store))
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("shutdown signal received");
        })
        .await
        .context("metrics server failed")?;

    let _ = shutdown_tx.send(true);
    engine.join(SHUTDOWN_GRACE).await;

    info!("a2s reporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
