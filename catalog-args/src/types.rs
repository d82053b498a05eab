use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a provider argument.
///
/// Serialized as `NUMBER`, `ARRAY`, `OBJECT`, `BOOLEAN`, `STRING` or
/// `UNKNOWN`. The legacy `BUTTER_PROVIDER_ARG_TYPE_*` tokens are accepted on
/// input. Any other name deserializes to [`ArgType::String`], which passes
/// raw text through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ArgType {
    /// Numeric value (integer or float).
    Number,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// Boolean, see [`BooleanCoercion`].
    Boolean,
    /// Raw text, passed through.
    String,
    /// Undeclared key: JSON if it parses, raw text otherwise.
    #[default]
    Unknown,
}

impl ArgType {
    /// Returns the serialized name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ArgType::Number => "NUMBER",
            ArgType::Array => "ARRAY",
            ArgType::Object => "OBJECT",
            ArgType::Boolean => "BOOLEAN",
            ArgType::String => "STRING",
            ArgType::Unknown => "UNKNOWN",
        }
    }
}

impl From<&str> for ArgType {
    fn from(name: &str) -> Self {
        let name = name.strip_prefix("BUTTER_PROVIDER_ARG_TYPE_").unwrap_or(name);
        match name {
            "NUMBER" => ArgType::Number,
            "ARRAY" => ArgType::Array,
            "OBJECT" => ArgType::Object,
            "BOOLEAN" => ArgType::Boolean,
            "UNKNOWN" => ArgType::Unknown,
            _ => ArgType::String,
        }
    }
}

impl From<String> for ArgType {
    fn from(name: String) -> Self {
        ArgType::from(name.as_str())
    }
}

impl From<ArgType> for &'static str {
    fn from(ty: ArgType) -> Self {
        ty.as_str()
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How raw text is turned into a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanCoercion {
    /// Any non-empty text is `true`, including the text `"false"`.
    ///
    /// Matches what existing provider identifiers were written against.
    #[default]
    Truthy,
    /// `false`, `0`, `no` and `off` (any case) are `false` as well.
    Strict,
}

impl BooleanCoercion {
    pub(crate) fn coerce(self, raw: &str) -> bool {
        match self {
            BooleanCoercion::Truthy => !raw.is_empty(),
            BooleanCoercion::Strict => {
                let raw = raw.trim();
                !(raw.is_empty()
                    || ["false", "0", "no", "off"]
                        .iter()
                        .any(|falsy| raw.eq_ignore_ascii_case(falsy)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_tokens_are_accepted() {
        let ty: ArgType = serde_json::from_value(json!("BUTTER_PROVIDER_ARG_TYPE_ARRAY")).unwrap();
        assert_eq!(ty, ArgType::Array);
        assert_eq!(serde_json::to_value(ty).unwrap(), json!("ARRAY"));
    }

    #[test]
    fn test_unrecognized_names_pass_through_as_string() {
        let ty: ArgType = serde_json::from_value(json!("DATE")).unwrap();
        assert_eq!(ty, ArgType::String);
    }

    #[test]
    fn test_strict_booleans() {
        for falsy in ["", "false", "FALSE", "0", "no", " off "] {
            assert!(!BooleanCoercion::Strict.coerce(falsy), "{falsy:?}");
        }
        for truthy in ["true", "1", "yes"] {
            assert!(BooleanCoercion::Strict.coerce(truthy), "{truthy:?}");
        }
    }
}
