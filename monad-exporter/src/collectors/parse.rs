//! Field extraction for JSON-RPC results.
//!
//! Every helper returns `Option<f64>`: `Some` only for a present,
//! well-formed, finite value. Collectors write `Some` and skip `None`.

use prometheus::Gauge;
use serde_json::Value;

const FINGERPRINT_MODULUS: u64 = 1_000_000_000_000;

/// Parses a base-16 quantity such as `"0x1a"`.
///
/// The `0x`/`0X` prefix is optional, at least one digit is required, and
/// the value must fit in 128 bits. Anything wider is rejected rather than
/// written; every quantity the collectors read (wei, gas, heights,
/// timestamps) fits in 256 bits on the wire but well under 128 in practice.
pub fn parse_hex_int(s: &str) -> Option<u128> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u128::from_str_radix(digits, 16).ok()
}

/// A hex-encoded quantity field as a gauge value.
pub fn hex_quantity(value: &Value) -> Option<f64> {
    value.as_str().and_then(parse_hex_int).map(|n| n as f64)
}

/// Looks up `key` in an object result and parses it as a hex quantity.
pub fn hex_field(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key).and_then(hex_quantity)
}

/// A decimal number, given either as a JSON number or a string.
///
/// Integer strings are parsed exactly first, then as a float.
pub fn decimal(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(i) => i as f64,
                Err(_) => s.parse::<f64>().ok()?,
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Truthiness of an `eth_syncing` result as 1.0 / 0.0.
///
/// `false` and empty values mean "not syncing"; a progress object means
/// syncing. `null` yields nothing.
pub fn syncing_flag(value: &Value) -> Option<f64> {
    let truthy = match value {
        Value::Null => return None,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    };
    Some(if truthy { 1.0 } else { 0.0 })
}

/// Lossy numeric fingerprint of a client version string.
///
/// Prometheus gauges cannot carry strings, so the version is hashed
/// (BLAKE3, first 8 bytes little-endian) and reduced modulo 10^12. Equal
/// strings always map to the same value and different strings almost
/// always differ, which is enough to alert on a client upgrade. The value
/// itself means nothing.
pub fn client_version_fingerprint(version: &str) -> f64 {
    let digest = blake3::hash(version.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);
    (u64::from_le_bytes(prefix) % FINGERPRINT_MODULUS) as f64
}

/// The last element of an array member, if any.
pub fn last_of<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key)?.as_array()?.last()
}

/// Writes `value` into `gauge` when present; returns whether it wrote.
pub fn set_if_present(gauge: &Gauge, value: Option<f64>) -> bool {
    match value {
        Some(v) if v.is_finite() => {
            gauge.set(v);
            true
        }
        _ => false,
    }
}
