//! Network identity and sync state.

use async_trait::async_trait;

use super::Collector;
use super::parse::{
    client_version_fingerprint, decimal, hex_quantity, set_if_present, syncing_flag,
};
use crate::metrics::ChainMetrics;
use crate::rpc::RpcClient;

/// Collects `net_version`, `eth_chainId`, `eth_syncing` and
/// `web3_clientVersion`.
pub struct NetworkCollector;

#[async_trait]
impl Collector for NetworkCollector {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn collect(&self, rpc: &RpcClient, metrics: &ChainMetrics) {
        if let Some(v) = rpc.call("net_version", vec![]).await.into_value() {
            set_if_present(&metrics.network_version, decimal(&v));
        }

        if let Some(v) = rpc.call("eth_chainId", vec![]).await.into_value() {
            set_if_present(&metrics.chain_id, hex_quantity(&v));
        }

        if let Some(v) = rpc.call("eth_syncing", vec![]).await.into_value() {
            set_if_present(&metrics.is_syncing, syncing_flag(&v));
        }

        if let Some(v) = rpc.call("web3_clientVersion", vec![]).await.into_value() {
            let fingerprint = v.as_str().map(client_version_fingerprint);
            set_if_present(&metrics.client_version, fingerprint);
        }
    }
}
