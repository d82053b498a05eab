//! Derivation of cache keys from call arguments.

use catalog_core::KeyPart;
use catalog_core::json::canonical_json;
use serde::Serialize;
use thiserror::Error;

/// The arguments of a call could not be turned into a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot derive cache key: {message}")]
pub struct KeyError {
    message: String,
}

impl KeyError {
    /// Creates a key error with a human readable reason.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the reason.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Maps call arguments to the parts of a cache key.
///
/// The gate prefixes the parts with its label. Equal parts mean the calls
/// share one memoized result.
pub trait KeyFn<Args>: Send + Sync + 'static {
    /// Returns the key parts for `args`.
    fn key(&self, args: &Args) -> Result<Vec<KeyPart>, KeyError>;
}

impl<Args, F> KeyFn<Args> for F
where
    F: Fn(&Args) -> Result<Vec<KeyPart>, KeyError> + Send + Sync + 'static,
{
    fn key(&self, args: &Args) -> Result<Vec<KeyPart>, KeyError> {
        self(args)
    }
}

/// Keys calls by the canonical JSON of their arguments.
///
/// Object keys are sorted at every depth, so maps built in a different
/// order still share one entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonKey;

impl<Args: Serialize> KeyFn<Args> for JsonKey {
    fn key(&self, args: &Args) -> Result<Vec<KeyPart>, KeyError> {
        let value = serde_json::to_value(args).map_err(|err| KeyError::new(err.to_string()))?;
        Ok(vec![KeyPart::new("args", Some(canonical_json(&value)))])
    }
}
