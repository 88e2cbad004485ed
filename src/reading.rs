//! Canonical reading record and payload normalization.
//!
//! Clients submit readings under several historical field names. The tables
//! below are the authoritative alias lists, resolved first-present-wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Classification label applied when the client omits one.
pub const DEFAULT_CLASSIFICATION: &str = "UNKNOWN";

/// Accepted field names for the frequency value, in priority order.
pub const FREQUENCY_ALIASES: &[&str] = &["frequency_hz", "frequency", "freq_hz"];

/// Accepted field names for the signal strength value, in priority order.
pub const SIGNAL_ALIASES: &[&str] = &["signal_dbm", "signalStrength", "signal", "s"];

/// A submission that failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required numeric field is absent under all its aliases or does not
    /// coerce to a finite number.
    #[error("field '{0}' must be a finite number")]
    NonFiniteNumber(&'static str),
}

/// One ingested sensor observation.
///
/// `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub frequency_hz: f64,
    pub signal_dbm: f64,
    pub classification: String,
    pub timestamp: i64,
}

impl Reading {
    /// Build a canonical reading from an untrusted payload.
    ///
    /// Applies alias resolution, numeric coercion, and defaulting:
    /// - frequency and signal must coerce to finite numbers,
    /// - `classification` falls back to `"UNKNOWN"` when absent or empty,
    /// - `timestamp` falls back to `now_ms` when absent or non-coercible.
    pub fn normalize(payload: &Value, now_ms: i64) -> Result<Self, ValidationError> {
        let frequency_hz = first_present(payload, FREQUENCY_ALIASES)
            .and_then(coerce_finite)
            .ok_or(ValidationError::NonFiniteNumber("frequency_hz"))?;

        let signal_dbm = first_present(payload, SIGNAL_ALIASES)
            .and_then(coerce_finite)
            .ok_or(ValidationError::NonFiniteNumber("signal_dbm"))?;

        let classification = payload
            .get("classification")
            .and_then(coerce_text)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLASSIFICATION.to_string());

        let timestamp = payload
            .get("timestamp")
            .and_then(coerce_finite)
            .map(|ms| ms as i64)
            .unwrap_or(now_ms);

        Ok(Self {
            frequency_hz,
            signal_dbm,
            classification,
            timestamp,
        })
    }
}

/// Resolve the first alias present in the payload.
///
/// JSON `null` counts as absent. The selected alias is final: a value that
/// later fails coercion does not fall through to the next alias.
fn first_present<'a>(payload: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| payload.get(key))
        .find(|v| !v.is_null())
}

/// Coerce a JSON value to a finite f64.
///
/// Accepts numbers and numeric strings; anything else (including NaN and
/// infinities) fails coercion.
fn coerce_finite(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce a JSON scalar to text.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
