//! `eth_feeHistory` window.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::Collector;
use super::parse::{decimal, hex_quantity, last_of, set_if_present};
use crate::metrics::ChainMetrics;
use crate::rpc::RpcClient;

/// Collects the newest base fee and gas-used ratio from a fee history
/// window ending at `latest`.
///
/// Only the last element of each array is used. Empty arrays (genesis,
/// misconfigured nodes) are skipped.
pub struct FeeHistoryCollector {
    pub block_count: u64,
    pub reward_percentiles: Vec<u64>,
}

impl Default for FeeHistoryCollector {
    fn default() -> Self {
        Self {
            block_count: 4,
            reward_percentiles: vec![25, 75],
        }
    }
}

impl FeeHistoryCollector {
    fn params(&self) -> Vec<Value> {
        vec![
            json!(self.block_count),
            json!("latest"),
            json!(self.reward_percentiles),
        ]
    }

    pub fn record_history(history: &Value, metrics: &ChainMetrics) {
        set_if_present(
            &metrics.fee_history_base_fee,
            last_of(history, "baseFeePerGas").and_then(hex_quantity),
        );
        set_if_present(
            &metrics.fee_history_gas_used_ratio,
            last_of(history, "gasUsedRatio").and_then(decimal),
        );
    }
}

#[async_trait]
impl Collector for FeeHistoryCollector {
    fn name(&self) -> &'static str {
        "fee_history"
    }

    async fn collect(&self, rpc: &RpcClient, metrics: &ChainMetrics) {
        if let Some(history) = rpc.call("eth_feeHistory", self.params()).await.into_value() {
            Self::record_history(&history, metrics);
        }
    }
}
