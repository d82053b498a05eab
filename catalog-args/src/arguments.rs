use catalog_core::json::canonical_json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::NAME_KEY;

/// Decoded, typed provider arguments.
///
/// A thin read-only view over a JSON object. Keys keep the order in which
/// they were merged (defaults first, then the identifier's fields).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the value of `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` has a non-null value.
    pub fn contains(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    /// Name segment of the identifier the arguments were decoded from.
    pub fn name(&self) -> Option<&str> {
        self.get_str(NAME_KEY)
    }

    /// Returns `key` as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns `key` as a signed integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Returns `key` as a float.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Returns `key` as a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Returns `key` as an array.
    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    /// Returns `key` as an object.
    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Iterates over `(key, value)` pairs in merge order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the arguments and returns the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Serializes the arguments with object keys sorted at every depth.
    ///
    /// Two argument sets holding the same data render identically no matter
    /// in which order their keys were written, which makes the output usable
    /// as hash input.
    pub fn canonical_json(&self) -> String {
        canonical_json(&Value::Object(self.0.clone()))
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_ignores_insertion_order() {
        let a: Map<String, Value> =
            serde_json::from_value(json!({"b": 1, "a": {"y": 2, "x": [ {"d": 1, "c": 2} ]}}))
                .unwrap();
        let b: Map<String, Value> =
            serde_json::from_value(json!({"a": {"x": [ {"c": 2, "d": 1} ], "y": 2}, "b": 1}))
                .unwrap();

        let a = Arguments::from_map(a);
        let b = Arguments::from_map(b);

        assert_eq!(a.canonical_json(), b.canonical_json());
        assert_eq!(a.canonical_json(), r#"{"a":{"x":[{"c":2,"d":1}],"y":2},"b":1}"#);
    }

    #[test]
    fn test_null_is_not_contained() {
        let args = Arguments::from_map(
            serde_json::from_value(json!({"a": null, "b": false})).unwrap(),
        );
        assert!(!args.contains("a"));
        assert!(args.contains("b"));
        assert!(!args.contains("c"));
    }
}
