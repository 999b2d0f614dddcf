//! JSON-RPC client with per-method failure accounting.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;
use crate::metrics::RpcMetrics;

/// A single JSON-RPC 2.0 request envelope.
#[derive(Clone, Debug, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// Result of one call, as seen by collectors.
#[derive(Debug)]
pub enum RpcOutcome {
    /// The `result` member (`Value::Null` when the node omitted it).
    Success(Value),
    /// The node answered with an `error` object.
    ProtocolError { code: i64, message: String },
    /// The round trip itself failed.
    TransportError(RpcError),
}

impl RpcOutcome {
    /// The result value, if the call succeeded with a non-null result.
    pub fn into_value(self) -> Option<Value> {
        match self {
            RpcOutcome::Success(Value::Null) => None,
            RpcOutcome::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RpcOutcome::Success(_))
    }
}

impl fmt::Display for RpcOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcOutcome::Success(v) => write!(f, "ok: {v}"),
            RpcOutcome::ProtocolError { code, message } => {
                write!(f, "rpc error {code}: {message}")
            }
            RpcOutcome::TransportError(e) => write!(f, "{e}"),
        }
    }
}

/// Moves one request over the wire and returns the decoded response body.
///
/// Implementations must bound the time they spend on a request.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn send(&self, request: &RpcRequest) -> Result<Value, RpcError>;
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// JSON-RPC client shared by all collectors.
///
/// Every failed call (transport or protocol) bumps
/// `monad_rpc_errors_total{method}` exactly once. Nothing is ever returned
/// as an `Err`; callers match on [`RpcOutcome`].
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
    metrics: RpcMetrics,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>, metrics: RpcMetrics) -> Self {
        Self {
            transport,
            metrics,
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn call(&self, method: &str, params: Vec<Value>) -> RpcOutcome {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);

        let start = Instant::now();
        let sent = self.transport.send(&request).await;
        self.metrics
            .response_time_seconds
            .with_label_values(&[method])
            .observe(start.elapsed().as_secs_f64());

        let outcome = match sent {
            Ok(body) => interpret(body),
            Err(e) => RpcOutcome::TransportError(e),
        };

        if !outcome.is_success() {
            self.metrics.errors_total.with_label_values(&[method]).inc();
            tracing::warn!(method, error = %outcome, "rpc call failed");
        }
        outcome
    }
}

fn interpret(body: Value) -> RpcOutcome {
    // serde would also read struct fields out of an array, in order.
    if !body.is_object() {
        return RpcOutcome::TransportError(RpcError::Decode(format!(
            "expected a JSON object, got {body}"
        )));
    }

    let response: RpcResponse = match serde_json::from_value(body) {
        Ok(r) => r,
        Err(e) => return RpcOutcome::TransportError(RpcError::Decode(e.to_string())),
    };

    match response.error {
        Some(Value::Object(obj)) => RpcOutcome::ProtocolError {
            code: obj.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: obj
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        Some(other) => RpcOutcome::ProtocolError {
            code: 0,
            message: other.to_string(),
        },
        None => RpcOutcome::Success(response.result.unwrap_or(Value::Null)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::metrics::MetricsRegistry;
    use crate::rpc::testing::{Reply, ScriptedTransport};

    fn client(transport: ScriptedTransport) -> (RpcClient, MetricsRegistry) {
        let registry = MetricsRegistry::new().expect("registry");
        let client = RpcClient::new(Arc::new(transport), registry.rpc.clone());
        (client, registry)
    }

    fn errors(registry: &MetricsRegistry, method: &str) -> u64 {
        registry.rpc.errors_total.with_label_values(&[method]).get()
    }

    #[test]
    fn request_serializes_as_jsonrpc_2() {
        let params = vec![json!(4), json!("latest"), json!([25, 75])];
        let req = RpcRequest::new(7, "eth_feeHistory", params);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "eth_feeHistory",
                "params": [4, "latest", [25, 75]]
            })
        );
    }

    #[tokio::test]
    async fn success_returns_result_and_counts_nothing() {
        let (client, registry) =
            client(ScriptedTransport::new().with("eth_chainId", Reply::Result(json!("0x1"))));
        let outcome = client.call("eth_chainId", vec![]).await;
        assert_eq!(outcome.into_value(), Some(json!("0x1")));
        assert_eq!(errors(&registry, "eth_chainId"), 0);
    }

    #[test]
    fn missing_result_is_success_null() {
        let outcome = interpret(json!({"jsonrpc": "2.0", "id": 1}));
        assert!(matches!(outcome, RpcOutcome::Success(Value::Null)));
        assert_eq!(outcome.into_value(), None);
    }

    #[test]
    fn null_error_member_is_ignored() {
        let outcome = interpret(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x2",
            "error": null
        }));
        assert!(matches!(outcome, RpcOutcome::Success(ref v) if v == "0x2"));
    }

    #[test]
    fn non_object_body_is_a_decode_failure() {
        for body in [
            json!("gateway says no"),
            json!([]),
            json!(["0x5"]),
            json!(["0x5", null]),
            json!(42),
            Value::Null,
        ] {
            let outcome = interpret(body.clone());
            assert!(
                matches!(outcome, RpcOutcome::TransportError(RpcError::Decode(_))),
                "{body} -> {outcome:?}"
            );
        }
    }

    #[tokio::test]
    async fn array_body_is_counted_and_yields_no_value() {
        let (client, registry) = client(
            ScriptedTransport::new().with("eth_gasPrice", Reply::Raw(json!(["0x5"]))),
        );
        let outcome = client.call("eth_gasPrice", vec![]).await;
        assert!(matches!(outcome, RpcOutcome::TransportError(RpcError::Decode(_))));
        assert_eq!(outcome.into_value(), None);
        assert_eq!(errors(&registry, "eth_gasPrice"), 1);
    }

    #[tokio::test]
    async fn protocol_error_is_counted_once() {
        let (client, registry) = client(
            ScriptedTransport::new().with("eth_gasPrice", Reply::Error(-32000, "header not found")),
        );
        match client.call("eth_gasPrice", vec![]).await {
            RpcOutcome::ProtocolError { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "header not found");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(errors(&registry, "eth_gasPrice"), 1);
        assert_eq!(errors(&registry, "eth_chainId"), 0);
    }

    #[tokio::test]
    async fn transport_error_is_counted_once_per_call() {
        let transport =
            ScriptedTransport::new().with("eth_gasPrice", Reply::Fail(|| RpcError::Timeout));
        let (client, registry) = client(transport);
        for expected in 1..=3 {
            let outcome = client.call("eth_gasPrice", vec![]).await;
            assert!(matches!(outcome, RpcOutcome::TransportError(RpcError::Timeout)));
            assert_eq!(errors(&registry, "eth_gasPrice"), expected);
        }
    }

    #[tokio::test]
    async fn request_ids_increase() {
        let transport =
            Arc::new(ScriptedTransport::new().with("net_version", Reply::Result(json!("1"))));
        let registry = MetricsRegistry::new().unwrap();
        let client = RpcClient::new(transport.clone(), registry.rpc.clone());
        client.call("net_version", vec![]).await;
        client.call("net_version", vec![]).await;
        let ids: Vec<u64> = transport.seen.lock().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
