//! Monad exporter library crate.
//!
//! Polls a Monad (or any Ethereum-style) JSON-RPC endpoint on a fixed
//! interval and republishes node and chain state as Prometheus gauges:
//!
//! - endpoint and process configuration (`config`),
//! - a JSON-RPC client with per-method failure counting (`rpc`),
//! - the Prometheus registry and `/metrics` exporter (`metrics`),
//! - the network, block, gas and fee-history collectors (`collectors`),
//! - and the loop that drives them (`poller`).

pub mod collectors;
pub mod config;
pub mod error;
pub mod metrics;
pub mod poller;
pub mod rpc;

pub use collectors::{
    BlockCollector, Collector, FeeHistoryCollector, GasCollector, NetworkCollector,
    default_collectors,
};
pub use config::{ExporterConfig, MetricsConfig, RpcConfig};
pub use error::{ConfigError, ExporterError, RpcError};
pub use metrics::{ChainMetrics, MetricsRegistry, bind_metrics_listener, serve_metrics};
pub use poller::PollLoop;
pub use rpc::{HttpTransport, RpcClient, RpcOutcome, RpcRequest, RpcTransport};
