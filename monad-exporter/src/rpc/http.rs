//! HTTP transport for the JSON-RPC client.
//!
//! Requests are POSTed as JSON to a single endpoint. Certificate
//! validation is governed by [`RpcConfig::accept_invalid_certs`]; the
//! exporter runs with it enabled so it can talk to nodes that present
//! self-signed certificates. Nothing else in the process makes outbound
//! TLS connections.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::client::{RpcRequest, RpcTransport};
use crate::config::RpcConfig;
use crate::error::{ExporterError, RpcError};

/// `reqwest`-backed [`RpcTransport`].
///
/// The underlying client pools connections and is safe to share.
pub struct HttpTransport {
    url: url::Url,
    client: Client,
}

impl HttpTransport {
    pub fn new(cfg: &RpcConfig) -> Result<Self, ExporterError> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .danger_accept_invalid_certs(cfg.accept_invalid_certs)
            .build()
            .map_err(|e| ExporterError::HttpClient(e.to_string()))?;

        Ok(Self {
            url: cfg.url.clone(),
            client,
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, request: &RpcRequest) -> Result<Value, RpcError> {
        let resp = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RpcError::Http(status.as_u16()));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| RpcError::Decode(e.to_string()))
    }
}
