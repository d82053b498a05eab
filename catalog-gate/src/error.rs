use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::key::KeyError;

/// Failure of a gated call.
///
/// Every caller attached to one in-flight call receives a clone of the same
/// error, hence the producer error is shared behind an [`Arc`]. Both variants
/// display as the error they wrap.
#[derive(Debug)]
pub enum GateError<E> {
    /// The producer failed. The entry has been evicted.
    Producer(Arc<E>),
    /// No cache key could be derived. The producer was not invoked.
    InvalidKey(KeyError),
}

impl<E> GateError<E> {
    /// Returns the producer error, if that is what failed.
    pub fn producer_error(&self) -> Option<&E> {
        match self {
            GateError::Producer(err) => Some(err),
            GateError::InvalidKey(_) => None,
        }
    }
}

impl<E> Clone for GateError<E> {
    fn clone(&self) -> Self {
        match self {
            GateError::Producer(err) => GateError::Producer(Arc::clone(err)),
            GateError::InvalidKey(err) => GateError::InvalidKey(err.clone()),
        }
    }
}

impl<E> From<KeyError> for GateError<E> {
    fn from(err: KeyError) -> Self {
        GateError::InvalidKey(err)
    }
}

impl<E: fmt::Display> fmt::Display for GateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::Producer(err) => fmt::Display::fmt(err, f),
            GateError::InvalidKey(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl<E: Error + 'static> Error for GateError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GateError::Producer(err) => err.source(),
            GateError::InvalidKey(err) => err.source(),
        }
    }
}
