//! Error and diagnostic types for argument decoding.

use thiserror::Error;

use crate::types::ArgType;

/// Fatal decoding error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    /// The configuration is neither an identifier string nor a mapping.
    #[error("provider arguments must be a string or a mapping, got {found}")]
    InvalidArgumentShape {
        /// JSON kind of the rejected value.
        found: &'static str,
    },
}

/// Why a single raw value could not be coerced to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFieldError {
    /// The raw text is not a finite number.
    #[error("{raw:?} is not a number")]
    InvalidNumber {
        /// Offending text.
        raw: String,
    },
    /// The raw text is not valid JSON.
    #[error("invalid JSON: {message}")]
    InvalidJson {
        /// Parser message.
        message: String,
    },
    /// The raw text is valid JSON of the wrong kind.
    #[error("expected a JSON {expected}, got {found}")]
    UnexpectedKind {
        /// Kind required by the declared type.
        expected: &'static str,
        /// Kind that was parsed.
        found: &'static str,
    },
    /// The pair had no `=value` part.
    #[error("no value given")]
    MissingValue,
}

/// Non-fatal condition reported while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeDiagnostic {
    /// A field was dropped because its raw text did not match its type.
    #[error("cannot decode argument {key} as {ty}: {source}")]
    Field {
        /// Argument name.
        key: String,
        /// Declared type.
        ty: ArgType,
        /// Coercion failure.
        #[source]
        source: DecodeFieldError,
    },
    /// A declared argument has no value after merging with defaults.
    #[error("value {key} was not provided")]
    MissingRequiredField {
        /// Argument name.
        key: String,
    },
}

impl DecodeDiagnostic {
    /// Name of the argument the diagnostic is about.
    pub fn key(&self) -> &str {
        match self {
            DecodeDiagnostic::Field { key, .. } | DecodeDiagnostic::MissingRequiredField { key } => {
                key
            }
        }
    }
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
