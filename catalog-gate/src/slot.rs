//! Per-key bookkeeping of a gate.

use chrono::{DateTime, Utc};
use catalog_core::{CacheState, CacheValue};
use futures::future::{BoxFuture, Shared};

use crate::error::GateError;

/// Outcome of a producer call as seen by every attached caller.
pub(crate) type Settled<V, E> = Result<V, GateError<E>>;

/// In-flight producer call shared by all callers of one key.
pub(crate) type InFlight<V, E> = Shared<BoxFuture<'static, Settled<V, E>>>;

/// What a gate keeps under one cache key.
pub(crate) enum Slot<V, E> {
    /// A memoized value, possibly being refreshed in the background.
    Cached {
        value: CacheValue<V>,
        refreshing: bool,
    },
    /// A producer call nobody has seen settle yet.
    ///
    /// `id` tells a settling call whether the slot is still its own.
    Pending { id: u64, call: InFlight<V, E> },
}

impl<V, E> Slot<V, E> {
    pub(crate) fn is_pending(&self, pending_id: u64) -> bool {
        matches!(self, Slot::Pending { id, .. } if *id == pending_id)
    }

    pub(crate) fn cached(&self) -> Option<&CacheValue<V>> {
        match self {
            Slot::Cached { value, .. } => Some(value),
            Slot::Pending { .. } => None,
        }
    }

    pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.cached()
            .is_some_and(|value| matches!(value.cache_state(now), CacheState::Expired(_)))
    }
}

/// Decision taken for a call while its key is locked.
pub(crate) enum Lookup<V, E, Args> {
    /// Fresh value.
    Hit(V),
    /// Stale value; the caller now owns the refresh and gets the arguments back.
    Refresh(V, Args),
    /// Attach to a call started by someone else.
    Await(InFlight<V, E>),
    /// This caller registered a new call.
    Proceed(InFlight<V, E>),
}
