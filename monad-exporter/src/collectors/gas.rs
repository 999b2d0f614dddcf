//! Gas price.

use async_trait::async_trait;

use super::Collector;
use super::parse::{hex_quantity, set_if_present};
use crate::metrics::ChainMetrics;
use crate::rpc::RpcClient;

/// Collects `eth_gasPrice` (wei).
pub struct GasCollector;

#[async_trait]
impl Collector for GasCollector {
    fn name(&self) -> &'static str {
        "gas"
    }

    async fn collect(&self, rpc: &RpcClient, metrics: &ChainMetrics) {
        if let Some(v) = rpc.call("eth_gasPrice", vec![]).await.into_value() {
            set_if_present(&metrics.gas_price, hex_quantity(&v));
        }
    }
}
