use serde_json::{Map, Value};

use crate::error::{ArgsError, json_kind};

/// Configuration handed to a provider: an identifier string or a ready map.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentSource {
    /// `name?key=value&...` identifier, decoded against the schema.
    Identifier(String),
    /// Already typed arguments, merged over the defaults as-is.
    Map(Map<String, Value>),
}

impl Default for ArgumentSource {
    fn default() -> Self {
        ArgumentSource::Map(Map::new())
    }
}

impl From<&str> for ArgumentSource {
    fn from(identifier: &str) -> Self {
        ArgumentSource::Identifier(identifier.to_owned())
    }
}

impl From<String> for ArgumentSource {
    fn from(identifier: String) -> Self {
        ArgumentSource::Identifier(identifier)
    }
}

impl From<Map<String, Value>> for ArgumentSource {
    fn from(map: Map<String, Value>) -> Self {
        ArgumentSource::Map(map)
    }
}

/// Accepts a string, an object or `null` (no arguments).
impl TryFrom<Value> for ArgumentSource {
    type Error = ArgsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(identifier) => Ok(ArgumentSource::Identifier(identifier)),
            Value::Object(map) => Ok(ArgumentSource::Map(map)),
            Value::Null => Ok(ArgumentSource::default()),
            other => Err(ArgsError::InvalidArgumentShape {
                found: json_kind(&other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_scalars_and_arrays() {
        for value in [json!(1), json!(true), json!([{"key1": "value1"}])] {
            assert!(matches!(
                ArgumentSource::try_from(value),
                Err(ArgsError::InvalidArgumentShape { .. })
            ));
        }
    }

    #[test]
    fn test_null_means_no_arguments() {
        assert_eq!(
            ArgumentSource::try_from(Value::Null).unwrap(),
            ArgumentSource::Map(Map::new())
        );
    }
}
