// src/main.rs
//
// Exporter binary:
//
// - configuration from the environment (and `.env`, if present)
// - Prometheus registry + exporter on :8000
// - HTTP JSON-RPC client
// - poll loop running the standard collectors until Ctrl-C.

use std::sync::Arc;

use tokio::signal;

use monad_exporter::{
    ExporterConfig, ExporterError, HttpTransport, MetricsRegistry, PollLoop, RpcClient,
    default_collectors,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "monad_exporter=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ExporterError> {
    // A missing .env file is the normal case in containers.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("no .env loaded: {e}");
    }

    let cfg = ExporterConfig::from_env()?;

    // ---------------------------
    // Metrics registry
    // ---------------------------

    let metrics = Arc::new(MetricsRegistry::new()?);

    // ---------------------------
    // RPC client (HTTP)
    // ---------------------------

    let transport = HttpTransport::new(&cfg.rpc)?;
    let rpc = Arc::new(RpcClient::new(Arc::new(transport), metrics.rpc.clone()));

    tracing::info!(
        endpoint = %cfg.rpc.redacted_endpoint(),
        interval_secs = cfg.poll_interval.as_secs(),
        timeout_secs = cfg.rpc.timeout.as_secs(),
        "starting Monad exporter on port {}",
        cfg.metrics.listen_addr.port()
    );

    // ---------------------------
    // Poll loop
    // ---------------------------

    let poller = PollLoop::new(rpc, metrics, default_collectors(), cfg.poll_interval);

    tokio::select! {
        res = poller.run(cfg.metrics.listen_addr) => res,
        _ = signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            Ok(())
        }
    }
}
