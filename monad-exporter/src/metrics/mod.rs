//! Metrics and instrumentation for the exporter.
//!
//! This module defines the Prometheus instruments the exporter publishes
//! and a small HTTP server that serves `/metrics` in Prometheus text
//! format (plus `/health`).
//!
//! Typical usage:
//!
//! ```ignore
//! use std::sync::Arc;
//! use monad_exporter::metrics::{MetricsRegistry, bind_metrics_listener, serve_metrics};
//!
//! let registry = Arc::new(MetricsRegistry::new()?);
//! let listener = bind_metrics_listener("0.0.0.0:8000".parse()?).await?;
//! tokio::spawn(serve_metrics(listener, registry.clone()));
//!
//! registry.chain.block_number.set(42.0);
//! ```

pub mod prometheus;

pub use prometheus::{
    ACCEPT_ERROR_BACKOFF, ChainMetrics, MetricsRegistry, PollMetrics, RpcMetrics,
    bind_metrics_listener, serve_metrics,
};
