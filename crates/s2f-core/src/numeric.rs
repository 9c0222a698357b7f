//! Lenient decoding of metric maps.
//!
//! The service emits metric and sweep rows as loosely typed JSON objects.
//! Only numeric cells are kept; strings, nulls and nested values are dropped
//! so a consumer sees them as absent fields.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

pub type NumericMap = BTreeMap<String, f64>;

/// Keep only the entries whose value is a JSON number.
pub fn retain_numeric(raw: BTreeMap<String, Value>) -> NumericMap {
    raw.into_iter()
        .filter_map(|(key, value)| value.as_f64().map(|v| (key, v)))
        .collect()
}

pub fn deserialize_numeric_map<'de, D>(deserializer: D) -> Result<NumericMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(retain_numeric(raw))
}

pub fn deserialize_opt_numeric_map<'de, D>(deserializer: D) -> Result<Option<NumericMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw.map(retain_numeric))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_non_numeric_cells() {
        let raw: BTreeMap<String, Value> = serde_json::from_value(json!({
            "pv_kw": 2,
            "utilization": 0.41,
            "label": "best",
            "missing": null,
            "nested": {"a": 1}
        }))
        .unwrap();

        let map = retain_numeric(raw);
        assert_eq!(map.len(), 2);
        assert_eq!(map["pv_kw"], 2.0);
        assert_eq!(map["utilization"], 0.41);
    }
}
