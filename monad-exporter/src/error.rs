//! Error types for the exporter.
//!
//! Only configuration and startup failures are fatal. RPC failures are
//! surfaced to collectors as [`crate::rpc::RpcOutcome`] values and never
//! escape the poll loop.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised while resolving configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set (or is empty).
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    /// A variable holds something that is not a URL.
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    /// A variable expected to hold an integer does not.
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    /// A duration variable was set to zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Transport-level failures of a single JSON-RPC round trip.
///
/// These all map to [`crate::rpc::RpcOutcome::TransportError`].
#[derive(Debug, Error)]
pub enum RpcError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned HTTP status {0}")]
    Http(u16),
    /// Connection, TLS or other I/O failure.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response body was not a JSON-RPC envelope.
    #[error("malformed response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RpcError::Timeout
        } else if let Some(status) = e.status() {
            RpcError::Http(status.as_u16())
        } else if e.is_decode() {
            RpcError::Decode(e.to_string())
        } else {
            RpcError::Transport(e.to_string())
        }
    }
}

/// Fatal errors that stop the exporter before (or instead of) polling.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to initialise metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("failed to bind metrics listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
