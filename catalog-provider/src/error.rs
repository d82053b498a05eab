use std::error::Error;
use std::sync::Arc;

use catalog_args::ArgsError;
use catalog_gate::{GateError, KeyError};
use thiserror::Error;

/// Boxed error of a concrete content source.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Error returned by a [`Source`](crate::Source) operation.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source relies on a default body that cannot produce data.
    #[error("Implement your own version of the '{method}' method")]
    NotImplemented {
        /// Name of the missing method.
        method: &'static str,
    },
    /// The source failed while talking to its backend.
    #[error("source failed: {0}")]
    Failed(#[source] BoxError),
    /// The source failed with a plain message.
    #[error("{0}")]
    Message(String),
}

impl SourceError {
    /// Wraps any error raised by the source.
    pub fn failed(err: impl Into<BoxError>) -> Self {
        SourceError::Failed(err.into())
    }

    /// Creates an error from a message.
    pub fn message(message: impl Into<String>) -> Self {
        SourceError::Message(message.into())
    }
}

/// Error returned by a [`Provider`](crate::Provider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The source failed. Shared by every caller of the same gated call.
    #[error(transparent)]
    Source(Arc<SourceError>),
    /// The call arguments could not be keyed.
    #[error(transparent)]
    InvalidKey(#[from] KeyError),
    /// The configuration identifier is neither a string nor a mapping.
    #[error(transparent)]
    InvalidArgumentShape(#[from] ArgsError),
    /// `random` was asked to pick from an empty page.
    #[error("fetch returned no results to pick from")]
    EmptyPage,
    /// An item lacks the configured unique id field.
    #[error("item has no `{field}` field")]
    MissingUniqueId {
        /// The configured unique id field.
        field: String,
    },
    /// The provider configuration could not be loaded.
    #[error("invalid provider configuration: {0}")]
    Config(String),
}

impl ProviderError {
    /// Returns the source error, if that is what failed.
    pub fn source_error(&self) -> Option<&SourceError> {
        match self {
            ProviderError::Source(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SourceError> for ProviderError {
    fn from(err: SourceError) -> Self {
        ProviderError::Source(Arc::new(err))
    }
}

impl From<GateError<SourceError>> for ProviderError {
    fn from(err: GateError<SourceError>) -> Self {
        match err {
            GateError::Producer(err) => ProviderError::Source(err),
            GateError::InvalidKey(err) => ProviderError::InvalidKey(err),
        }
    }
}
