//! Clock abstraction for freshness checks.
//!
//! Gates never call `Utc::now()` directly; they ask a [`TimeProvider`].
//! Production code uses [`SystemTimeProvider`]. Tests enable the
//! `test-helpers` feature and drive a `MockTimeProvider` by hand, so that
//! refresh and expiry windows can be crossed without sleeping.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait TimeProvider: Debug + Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for Arc<T> {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockTimeProvider;

#[cfg(any(test, feature = "test-helpers"))]
mod mock {
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    use chrono::{DateTime, Utc};

    use super::TimeProvider;

    /// Manually advanced clock for tests.
    ///
    /// Clones share the same instant.
    #[derive(Debug, Clone)]
    pub struct MockTimeProvider {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl Default for MockTimeProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTimeProvider {
        /// Creates a mock clock frozen at the current wall-clock instant.
        pub fn new() -> Self {
            Self::at(Utc::now())
        }

        /// Creates a mock clock frozen at `now`.
        pub fn at(now: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }

        /// Moves the clock forward.
        pub fn advance(&self, duration: Duration) {
            let delta = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
            let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
            *now = now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
        }

        /// Moves the clock forward by whole seconds.
        pub fn advance_secs(&self, secs: u64) {
            self.advance(Duration::from_secs(secs));
        }

        /// Sets the clock to `now`.
        pub fn set(&self, now: DateTime<Utc>) {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
        }
    }

    impl TimeProvider for MockTimeProvider {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_is_shared_between_clones() {
        let clock = MockTimeProvider::new();
        let start = clock.now();
        let other = clock.clone();

        other.advance_secs(90);

        assert_eq!(clock.now() - start, chrono::Duration::seconds(90));
    }
}
