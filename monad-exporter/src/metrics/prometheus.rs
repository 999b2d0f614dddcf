//! Prometheus-backed metrics and HTTP exporter.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and the exporter's strongly-typed instrument groups, and an
//! async HTTP exporter that serves `/metrics` using `hyper`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use prometheus::{
    self, Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};

use crate::error::ExporterError;

/// Pause after a failed `accept` (e.g. out of file descriptors).
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Prefix applied to every instrument name.
pub const NAMESPACE: &str = "monad";

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge, prometheus::Error> {
    let g = Gauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}

/// Node and chain gauges written by the collectors.
///
/// Every gauge is last-write-wins. Collectors only ever write finite
/// values; a failed read leaves the previous value in place.
#[derive(Clone)]
pub struct ChainMetrics {
    pub network_version: Gauge,
    pub chain_id: Gauge,
    pub is_syncing: Gauge,
    pub block_number: Gauge,
    pub block_gas_limit: Gauge,
    pub block_gas_used: Gauge,
    pub block_base_fee: Gauge,
    pub block_timestamp: Gauge,
    pub block_transaction_count: Gauge,
    pub gas_price: Gauge,
    pub fee_history_base_fee: Gauge,
    pub fee_history_gas_used_ratio: Gauge,
    /// Fingerprint of `web3_clientVersion`, not a version number.
    ///
    /// See [`crate::collectors::parse::client_version_fingerprint`].
    pub client_version: Gauge,
}

impl ChainMetrics {
    /// Registers chain gauges into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            network_version: gauge(registry, "network_version", "Network version")?,
            chain_id: gauge(registry, "chain_id", "Chain ID")?,
            is_syncing: gauge(registry, "is_syncing", "Node syncing status")?,
            block_number: gauge(registry, "block_number", "Current block number")?,
            block_gas_limit: gauge(registry, "block_gas_limit", "Block gas limit")?,
            block_gas_used: gauge(registry, "block_gas_used", "Block gas used")?,
            block_base_fee: gauge(registry, "block_base_fee", "Block base fee per gas")?,
            block_timestamp: gauge(registry, "block_timestamp", "Block timestamp")?,
            block_transaction_count: gauge(
                registry,
                "block_transaction_count",
                "Number of transactions in block",
            )?,
            gas_price: gauge(registry, "gas_price", "Current gas price in wei")?,
            fee_history_base_fee: gauge(
                registry,
                "fee_history_base_fee",
                "Base fee per gas from fee history",
            )?,
            fee_history_gas_used_ratio: gauge(
                registry,
                "fee_history_gas_used_ratio",
                "Gas used ratio from fee history",
            )?,
            client_version: gauge(
                registry,
                "client_version",
                "Node client version (as int hash)",
            )?,
        })
    }
}

/// Instruments owned by the RPC client.
#[derive(Clone)]
pub struct RpcMetrics {
    /// Failed calls by JSON-RPC method. Never decreases.
    pub errors_total: IntCounterVec,
    /// Round-trip latency by JSON-RPC method, failures included.
    pub response_time_seconds: HistogramVec,
}

impl RpcMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let errors_total = IntCounterVec::new(
            Opts::new("rpc_errors_total", "Total number of RPC errors"),
            &["method"],
        )?;
        registry.register(Box::new(errors_total.clone()))?;

        let response_time_seconds = HistogramVec::new(
            HistogramOpts::new("rpc_response_time_seconds", "Response time for RPC calls")
                .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["method"],
        )?;
        registry.register(Box::new(response_time_seconds.clone()))?;

        Ok(Self {
            errors_total,
            response_time_seconds,
        })
    }
}

/// Instruments describing the poll loop itself.
#[derive(Clone)]
pub struct PollMetrics {
    /// Wall-clock duration of the most recent tick.
    pub collection_time_seconds: Gauge,
}

impl PollMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            collection_time_seconds: gauge(
                registry,
                "metrics_collection_time_seconds",
                "Time taken to collect all metrics",
            )?,
        })
    }
}

/// Wrapper around a Prometheus registry and every exporter instrument.
///
/// This is the single sink the rest of the process writes into. Build one
/// at startup, wrap it in an [`Arc`] and hand out references; the
/// instrument handles are cheap clones of shared atomics.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub chain: ChainMetrics,
    pub rpc: RpcMetrics,
    pub poll: PollMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh, `monad`-prefixed
    /// underlying `Registry` and registers all instruments.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some(NAMESPACE.to_string()), None)?;
        let chain = ChainMetrics::register(&registry)?;
        let rpc = RpcMetrics::register(&registry)?;
        let poll = PollMetrics::register(&registry)?;
        Ok(Self {
            registry,
            chain,
            rpc,
            poll,
        })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode Prometheus metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Binds the exporter listener.
///
/// Kept separate from [`serve_metrics`] so a bind failure surfaces at
/// startup instead of inside a background task.
pub async fn bind_metrics_listener(addr: SocketAddr) -> Result<TcpListener, ExporterError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ExporterError::Bind { addr, source })
}

/// Serves Prometheus metrics on an already bound listener.
///
/// `GET /metrics` returns the text exposition format and `GET /health`
/// returns `OK`. All other requests get a 404. The server only reads
/// instrument values.
pub async fn serve_metrics(listener: TcpListener, metrics: Arc<MetricsRegistry>) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(e) => {
                accept_failed(&e).await;
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                handle_request(req, metrics)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                tracing::debug!(error = %err, "metrics connection error");
            }
        });
    }
}

/// Logs an `accept` error and waits before the next attempt.
///
/// Errors such as `EMFILE` return immediately and keep recurring, so
/// retrying without a pause would spin the runtime the poll loop shares.
async fn accept_failed(e: &std::io::Error) {
    tracing::warn!(error = %e, "failed to accept metrics connection");
    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
}

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (status, content_type, body) = match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => (
            StatusCode::OK,
            "text/plain; version=0.0.4",
            Bytes::from(metrics.gather_text()),
        ),
        (&Method::GET, "/health") => (StatusCode::OK, "text/plain", Bytes::from_static(b"OK")),
        _ => (
            StatusCode::NOT_FOUND,
            "text/plain",
            Bytes::from_static(b"not found"),
        ),
    };

    let mut resp = Response::new(Full::new(body));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(content_type));
    Ok(resp)
}
