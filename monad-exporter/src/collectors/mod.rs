//! Metric collectors.
//!
//! Each collector owns one thematic group of gauges. A collector issues
//! its RPC calls, extracts every field independently and writes only the
//! ones that parsed. Failed calls and bad fields are skipped without
//! touching the gauge, so a stale value stays visible until a later tick
//! succeeds.

pub mod block;
pub mod fee_history;
pub mod gas;
pub mod network;
pub mod parse;

use async_trait::async_trait;

use crate::metrics::ChainMetrics;
use crate::rpc::RpcClient;

pub use block::BlockCollector;
pub use fee_history::FeeHistoryCollector;
pub use gas::GasCollector;
pub use network::NetworkCollector;

/// One unit of the per-tick collection cycle.
///
/// Implementations must not fail: RPC failures are already accounted for
/// by [`RpcClient`], and unparsable fields are simply not written.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn collect(&self, rpc: &RpcClient, metrics: &ChainMetrics);
}

/// The standard collector set, in tick order.
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(NetworkCollector),
        Box::new(BlockCollector),
        Box::new(GasCollector),
        Box::new(FeeHistoryCollector::default()),
    ]
}
