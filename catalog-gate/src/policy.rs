use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::{DateTime, Utc};
use catalog_core::CacheValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default time-to-live of a memoized result.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Rejected gate policy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// The refresh fraction is not strictly between 0 and 1.
    #[error("refresh fraction must be within (0, 1), got {0}")]
    RefreshFraction(f64),
}

/// Share of the ttl after which a cached value is refreshed in the background.
///
/// Always strictly between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct RefreshFraction(f64);

impl RefreshFraction {
    /// Half of the ttl.
    pub const HALF: RefreshFraction = RefreshFraction(0.5);

    /// Validates `fraction`.
    pub fn new(fraction: f64) -> Result<Self, PolicyError> {
        if fraction > 0.0 && fraction < 1.0 {
            Ok(RefreshFraction(fraction))
        } else {
            Err(PolicyError::RefreshFraction(fraction))
        }
    }

    /// Returns the raw fraction.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Scales `ttl` by this fraction.
    pub fn of(self, ttl: Duration) -> Duration {
        ttl.mul_f64(self.0)
    }
}

impl Default for RefreshFraction {
    fn default() -> Self {
        Self::HALF
    }
}

impl TryFrom<f64> for RefreshFraction {
    type Error = PolicyError;

    fn try_from(fraction: f64) -> Result<Self, Self::Error> {
        Self::new(fraction)
    }
}

impl From<RefreshFraction> for f64 {
    fn from(fraction: RefreshFraction) -> Self {
        fraction.0
    }
}

/// Memoization policy of one gate.
///
/// ```yaml
/// ttl: 10m
/// refresh_fraction: 0.5
/// max_entries: 1000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GatePolicy {
    /// Lifetime of a memoized result (e.g., "10m", "30s").
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,
    /// When, as a share of `ttl`, a background refresh is started.
    #[serde(default)]
    pub refresh_fraction: RefreshFraction,
    /// Upper bound on cached entries. Unbounded when absent.
    #[serde(default)]
    pub max_entries: Option<NonZeroUsize>,
}

fn default_ttl() -> Duration {
    DEFAULT_TTL
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            refresh_fraction: RefreshFraction::default(),
            max_entries: None,
        }
    }
}

impl GatePolicy {
    /// Policy with the given ttl and default refresh fraction.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// Set the refresh fraction.
    pub fn refresh_fraction(self, refresh_fraction: RefreshFraction) -> Self {
        Self {
            refresh_fraction,
            ..self
        }
    }

    /// Set the entry bound.
    pub fn max_entries(self, max_entries: NonZeroUsize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..self
        }
    }

    /// Delay between production and the background refresh.
    pub fn refresh_after(&self) -> Duration {
        self.refresh_fraction.of(self.ttl)
    }

    /// Wraps a value produced at `now` with this policy's instants.
    pub(crate) fn entry<V>(&self, data: V, now: DateTime<Utc>) -> CacheValue<V> {
        CacheValue::fresh(data, now, self.ttl, self.refresh_after())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_fraction_bounds() {
        assert!(RefreshFraction::new(0.5).is_ok());
        assert!(RefreshFraction::new(0.99).is_ok());
        for invalid in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(
                RefreshFraction::new(invalid).is_err(),
                "{invalid} must be rejected"
            );
        }
    }

    #[test]
    fn test_refresh_after_is_share_of_ttl() {
        let policy = GatePolicy::new(Duration::from_secs(60))
            .refresh_fraction(RefreshFraction::new(0.25).unwrap());
        assert_eq!(policy.refresh_after(), Duration::from_secs(15));
    }

    #[test]
    fn test_defaults() {
        let policy = GatePolicy::default();
        assert_eq!(policy.ttl, Duration::from_secs(600));
        assert_eq!(policy.refresh_fraction.get(), 0.5);
        assert_eq!(policy.max_entries, None);
    }
}
