//! JSON-RPC plumbing.
//!
//! [`RpcClient`] is what collectors talk to: it turns a method name and
//! parameters into an [`RpcOutcome`], counting failures as it goes. The
//! wire itself sits behind the [`RpcTransport`] trait; [`HttpTransport`]
//! is the production implementation.

pub mod client;
pub mod http;

pub use client::{RpcClient, RpcOutcome, RpcRequest, RpcTransport};
pub use http::HttpTransport;

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport used by unit tests across the crate.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::{RpcRequest, RpcTransport};
    use crate::error::RpcError;

    /// What the scripted node answers for a method.
    pub enum Reply {
        Result(Value),
        /// Returned as the whole response body, envelope and all.
        Raw(Value),
        Error(i64, &'static str),
        Fail(fn() -> RpcError),
    }

    /// Answers every request from a fixed method -> reply table.
    ///
    /// Unknown methods get a `-32601` error object, like a real node.
    #[derive(Default)]
    pub struct ScriptedTransport {
        replies: HashMap<String, Reply>,
        pub seen: Mutex<Vec<RpcRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, method: &str, reply: Reply) -> Self {
            self.replies.insert(method.to_string(), reply);
            self
        }
    }

    #[async_trait]
    impl RpcTransport for ScriptedTransport {
        async fn send(&self, request: &RpcRequest) -> Result<Value, RpcError> {
            self.seen.lock().unwrap().push(request.clone());
            match self.replies.get(&request.method) {
                Some(Reply::Result(v)) => Ok(json!({
                    "jsonrpc": "2.0",
                    "id": request.id,
                    "result": v
                })),
                Some(Reply::Raw(body)) => Ok(body.clone()),
                Some(Reply::Error(code, msg)) => Ok(json!({
                    "jsonrpc": "2.0",
                    "id": request.id,
                    "error": {"code": code, "message": msg}
                })),
                Some(Reply::Fail(make)) => Err(make()),
                None => Ok(json!({
                    "jsonrpc": "2.0",
                    "id": request.id,
                    "error": {"code": -32601, "message": "method not found"}
                })),
            }
        }
    }
}
