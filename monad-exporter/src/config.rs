//! Top-level configuration for the exporter.
//!
//! This module aggregates configuration for:
//!
//! - the JSON-RPC endpoint (URL with optional `dkey` credential + timeout),
//! - the Prometheus exporter (listen address),
//! - the poll interval.
//!
//! Everything is resolved once at startup from environment variables and is
//! immutable afterwards.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const RPC_URL_VAR: &str = "MONAD_RPC_URL";
pub const RPC_KEY_VAR: &str = "MONAD_RPC_KEY";
pub const POLL_INTERVAL_VAR: &str = "POLL_INTERVAL";
pub const RPC_TIMEOUT_VAR: &str = "RPC_TIMEOUT";

/// Query parameter the RPC provider expects the API key in.
const API_KEY_PARAM: &str = "dkey";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 5;

/// Configuration for the JSON-RPC endpoint.
#[derive(Clone, Debug)]
pub struct RpcConfig {
    /// Fully resolved endpoint, credential already embedded.
    pub url: Url,
    /// Upper bound on a single request, connect included.
    pub timeout: Duration,
    /// Skip TLS certificate validation.
    ///
    /// Always `true` for now: the exporter is deployed against internal
    /// nodes that serve self-signed certificates. This applies to the RPC
    /// endpoint only.
    pub accept_invalid_certs: bool,
}

impl RpcConfig {
    /// Endpoint description that is safe to log (no query string).
    pub fn redacted_endpoint(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.to_string()
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

/// Top-level configuration for the exporter process.
#[derive(Clone, Debug)]
pub struct ExporterConfig {
    pub rpc: RpcConfig,
    pub metrics: MetricsConfig,
    /// Minimum spacing between the start of two consecutive ticks' sleeps.
    pub poll_interval: Duration,
}

impl ExporterConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base = get(RPC_URL_VAR).ok_or(ConfigError::Missing(RPC_URL_VAR))?;
        let base = Url::parse(base.trim()).map_err(|source| ConfigError::InvalidUrl {
            var: RPC_URL_VAR,
            source,
        })?;
        let url = match get(RPC_KEY_VAR) {
            Some(key) => with_api_key(base, key.trim()),
            None => base,
        };

        let poll_interval = duration_secs(
            POLL_INTERVAL_VAR,
            get(POLL_INTERVAL_VAR),
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        let timeout = duration_secs(
            RPC_TIMEOUT_VAR,
            get(RPC_TIMEOUT_VAR),
            DEFAULT_RPC_TIMEOUT_SECS,
        )?;

        Ok(Self {
            rpc: RpcConfig {
                url,
                timeout,
                accept_invalid_certs: true,
            },
            metrics: MetricsConfig::default(),
            poll_interval,
        })
    }
}

/// Returns `base` with `dkey=<key>` in its query string.
///
/// Other query parameters are kept in order; any previous `dkey` values
/// are replaced. The fragment is dropped.
pub fn with_api_key(mut base: Url, key: &str) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(name, _)| name != API_KEY_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    base.set_fragment(None);
    base.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(API_KEY_PARAM, key);
    base
}

fn duration_secs(
    var: &'static str,
    raw: Option<String>,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    let secs = match raw {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value })?,
        None => default_secs,
    };
    if secs == 0 {
        return Err(ConfigError::ZeroDuration(var));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ExporterConfig, ConfigError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ExporterConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let cfg = config(&[(RPC_URL_VAR, "https://rpc.example.org/")]).unwrap();
        assert_eq!(cfg.rpc.url.as_str(), "https://rpc.example.org/");
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.rpc.timeout, Duration::from_secs(5));
        assert!(cfg.rpc.accept_invalid_certs);
        assert_eq!(cfg.metrics.listen_addr.port(), 8000);
    }

    #[test]
    fn missing_url_is_an_error() {
        assert!(matches!(config(&[]), Err(ConfigError::Missing(RPC_URL_VAR))));
        assert!(matches!(
            config(&[(RPC_URL_VAR, "  ")]),
            Err(ConfigError::Missing(RPC_URL_VAR))
        ));
    }

    #[test]
    fn unparsable_url_is_an_error() {
        assert!(matches!(
            config(&[(RPC_URL_VAR, "not a url")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn api_key_is_appended_as_dkey() {
        let cfg = config(&[
            (RPC_URL_VAR, "https://rpc.example.org/monad"),
            (RPC_KEY_VAR, "secret"),
        ])
        .unwrap();
        assert_eq!(cfg.rpc.url.as_str(), "https://rpc.example.org/monad?dkey=secret");
        assert_eq!(cfg.rpc.redacted_endpoint(), "https://rpc.example.org/monad");
    }

    #[test]
    fn api_key_preserves_other_params_and_replaces_existing_dkey() {
        let base = Url::parse("https://rpc.example.org/?network=testnet&dkey=old#frag").unwrap();
        let url = with_api_key(base, "new");
        assert_eq!(url.as_str(), "https://rpc.example.org/?network=testnet&dkey=new");
    }

    #[test]
    fn poll_interval_and_timeout_are_read() {
        let cfg = config(&[
            (RPC_URL_VAR, "http://127.0.0.1:8080"),
            (POLL_INTERVAL_VAR, "15"),
            (RPC_TIMEOUT_VAR, "2"),
        ])
        .unwrap();
        assert_eq!(cfg.poll_interval, Duration::from_secs(15));
        assert_eq!(cfg.rpc.timeout, Duration::from_secs(2));
    }

    #[test]
    fn bad_or_zero_interval_is_rejected() {
        assert!(matches!(
            config(&[(RPC_URL_VAR, "http://127.0.0.1:8080"), (POLL_INTERVAL_VAR, "five")]),
            Err(ConfigError::InvalidNumber { var: POLL_INTERVAL_VAR, .. })
        ));
        assert!(matches!(
            config(&[(RPC_URL_VAR, "http://127.0.0.1:8080"), (POLL_INTERVAL_VAR, "0")]),
            Err(ConfigError::ZeroDuration(POLL_INTERVAL_VAR))
        ));
    }
}
