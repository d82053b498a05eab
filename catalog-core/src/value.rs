//! Cached value types with refresh and expiration metadata.
//!
//! A memoized value carries three instants:
//!
//! - **created** - when the producer settled
//! - **refresh** - after this instant the value is still served, but the next
//!   access should trigger a background refresh
//! - **expire** - after this instant the value is no longer valid and the next
//!   access is a full miss
//!
//! This allows the "stale-while-revalidate" pattern where stale data is
//! served immediately while fresh data is fetched asynchronously.
//!
//! ## Cache States
//!
//! [`CacheValue::cache_state`] compares the instants with a given `now`:
//!
//! - [`CacheState::Actual`] - Data is fresh (before the refresh instant)
//! - [`CacheState::Stale`] - Data should be refreshed but is not expired
//! - [`CacheState::Expired`] - Data has expired
//!
//! ```
//! use catalog_core::{CacheState, CacheValue};
//! use chrono::Utc;
//! use std::time::Duration;
//!
//! let now = Utc::now();
//! let value = CacheValue::fresh("page", now, Duration::from_secs(600), Duration::from_secs(300));
//!
//! assert!(matches!(value.cache_state(now), CacheState::Actual(_)));
//! ```

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Freshness of a cached entry relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState<Cached> {
    /// Data is past its refresh instant but not expired (usable, should refresh in background).
    Stale(Cached),
    /// Data is fresh and valid.
    Actual(Cached),
    /// Data has expired (must be produced again before use).
    Expired(Cached),
}

impl<Cached> CacheState<Cached> {
    /// Returns the wrapped value regardless of state.
    pub fn into_inner(self) -> Cached {
        match self {
            CacheState::Stale(c) | CacheState::Actual(c) | CacheState::Expired(c) => c,
        }
    }
}

/// A cached value with refresh and expiration metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheValue<T> {
    data: T,
    created: DateTime<Utc>,
    refresh: DateTime<Utc>,
    expire: DateTime<Utc>,
}

impl<T> CacheValue<T> {
    /// Creates a new cache value with explicit instants.
    pub fn new(
        data: T,
        created: DateTime<Utc>,
        refresh: DateTime<Utc>,
        expire: DateTime<Utc>,
    ) -> Self {
        CacheValue {
            data,
            created,
            refresh,
            expire,
        }
    }

    /// Creates a value produced at `now` that expires after `ttl` and asks
    /// for a refresh after `refresh_after`.
    ///
    /// Durations too large for the calendar saturate to the maximum instant.
    pub fn fresh(data: T, now: DateTime<Utc>, ttl: Duration, refresh_after: Duration) -> Self {
        CacheValue {
            data,
            created: now,
            refresh: offset(now, refresh_after),
            expire: offset(now, ttl),
        }
    }

    /// Returns a reference to the cached data.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when the producer settled.
    #[inline]
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Returns when the data should be refreshed in the background.
    #[inline]
    pub fn refresh(&self) -> DateTime<Utc> {
        self.refresh
    }

    /// Returns when the data expires.
    #[inline]
    pub fn expire(&self) -> DateTime<Utc> {
        self.expire
    }

    /// Consumes the cache value and returns the inner data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Remaining time until expiry, or `None` when already expired.
    pub fn ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expire - now).to_std().ok().filter(|d| !d.is_zero())
    }

    /// Check the cache state against `now`.
    ///
    /// Expiry wins over staleness: a value past both instants is `Expired`.
    pub fn cache_state(&self, now: DateTime<Utc>) -> CacheState<&Self> {
        if self.expire <= now {
            CacheState::Expired(self)
        } else if self.refresh <= now {
            CacheState::Stale(self)
        } else {
            CacheState::Actual(self)
        }
    }
}

fn offset(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(now: DateTime<Utc>) -> CacheValue<u32> {
        CacheValue::fresh(7, now, Duration::from_secs(600), Duration::from_secs(300))
    }

    #[test]
    fn test_state_follows_instants() {
        let now = Utc::now();
        let v = value(now);

        assert!(matches!(v.cache_state(now), CacheState::Actual(_)));
        assert!(matches!(
            v.cache_state(now + chrono::Duration::seconds(300)),
            CacheState::Stale(_)
        ));
        assert!(matches!(
            v.cache_state(now + chrono::Duration::seconds(599)),
            CacheState::Stale(_)
        ));
        assert!(matches!(
            v.cache_state(now + chrono::Duration::seconds(600)),
            CacheState::Expired(_)
        ));
    }

    #[test]
    fn test_ttl_counts_down() {
        let now = Utc::now();
        let v = value(now);
        assert_eq!(v.ttl(now), Some(Duration::from_secs(600)));
        assert_eq!(v.ttl(now + chrono::Duration::seconds(600)), None);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let now = Utc::now();
        let v = CacheValue::fresh((), now, Duration::MAX, Duration::MAX);
        assert_eq!(v.expire(), DateTime::<Utc>::MAX_UTC);
    }
}
