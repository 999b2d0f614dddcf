//! Latest-block metrics.
//!
//! `monad_block_number` is written twice per tick (from `eth_blockNumber`
//! and from the block object) and `monad_block_transaction_count` twice
//! (list length, then `eth_getBlockTransactionCountByNumber`). Both pairs
//! target `latest`, so if a block lands between the calls the gauges can
//! briefly describe different blocks. The later write wins.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::Collector;
use super::parse::{hex_field, hex_quantity, set_if_present};
use crate::metrics::ChainMetrics;
use crate::rpc::RpcClient;

/// Collects block height, gas, base fee, timestamp and transaction count.
pub struct BlockCollector;

impl BlockCollector {
    /// Writes the fields of an `eth_getBlockByNumber` object.
    ///
    /// Each field stands alone: a bad `baseFeePerGas` does not stop
    /// `gasLimit` from being written. `baseFeePerGas` is absent on
    /// pre-London blocks and is skipped quietly.
    pub fn record_block(block: &Value, metrics: &ChainMetrics) {
        set_if_present(&metrics.block_number, hex_field(block, "number"));
        set_if_present(&metrics.block_gas_limit, hex_field(block, "gasLimit"));
        set_if_present(&metrics.block_gas_used, hex_field(block, "gasUsed"));
        set_if_present(&metrics.block_base_fee, hex_field(block, "baseFeePerGas"));
        set_if_present(&metrics.block_timestamp, hex_field(block, "timestamp"));

        let tx_len = block
            .get("transactions")
            .and_then(Value::as_array)
            .map(|txs| txs.len() as f64);
        set_if_present(&metrics.block_transaction_count, tx_len);
    }
}

#[async_trait]
impl Collector for BlockCollector {
    fn name(&self) -> &'static str {
        "block"
    }

    async fn collect(&self, rpc: &RpcClient, metrics: &ChainMetrics) {
        if let Some(v) = rpc.call("eth_blockNumber", vec![]).await.into_value() {
            set_if_present(&metrics.block_number, hex_quantity(&v));
        }

        let block = rpc
            .call("eth_getBlockByNumber", vec![json!("latest"), json!(false)])
            .await;
        if let Some(block) = block.into_value() {
            Self::record_block(&block, metrics);
        }

        let count = rpc
            .call("eth_getBlockTransactionCountByNumber", vec![json!("latest")])
            .await;
        if let Some(v) = count.into_value() {
            set_if_present(&metrics.block_transaction_count, hex_quantity(&v));
        }
    }
}
