//! Canonical JSON rendering.
//!
//! Cache keys and provider identifiers are derived from JSON documents whose
//! key order depends on how they were built. [`canonical_json`] renders them
//! with object keys sorted at every depth so equal data yields equal text.

use serde_json::Value;

/// Renders `value` as compact JSON with object keys sorted recursively.
///
/// ```
/// use catalog_core::json::canonical_json;
/// use serde_json::json;
///
/// assert_eq!(canonical_json(&json!({"b": 1, "a": [{"d": 0, "c": 0}]})), r#"{"a":[{"c":0,"d":0}],"b":1}"#);
/// ```
pub fn canonical_json(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sorted(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_render_as_json() {
        assert_eq!(canonical_json(&json!("id")), r#""id""#);
        assert_eq!(canonical_json(&json!(null)), "null");
    }

    #[test]
    fn test_array_order_is_kept() {
        assert_eq!(canonical_json(&json!([3, 1, 2])), "[3,1,2]");
    }
}
