//! Content-based fingerprints for run requests.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::schema::RunRequest;

/// SHA-256 hex digest of the request's canonical JSON (object keys sorted).
///
/// Two requests with the same fingerprint ask the service for the same work.
pub fn config_fingerprint(request: &RunRequest) -> String {
    let mut hasher = Sha256::new();

    let canonical = sort_keys(serde_json::to_value(request).unwrap_or_default());
    hasher.update(canonical.to_string().as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Rebuild every object with its keys inserted in sorted order, so the
/// serialized form is sorted whether or not `serde_json` preserves
/// insertion order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
