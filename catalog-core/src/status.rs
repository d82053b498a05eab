//! Outcome classification for a single gated call.

/// How a gated call was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallStatus {
    /// A fresh cached value was returned.
    Hit,
    /// No usable entry existed; this caller started the producer.
    #[default]
    Miss,
    /// A cached value past its refresh instant was returned and a background
    /// refresh was started.
    Stale,
    /// The caller attached to a producer call that was already in flight.
    Coalesced,
}

impl CallStatus {
    /// Returns the status as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Hit => "hit",
            CallStatus::Miss => "miss",
            CallStatus::Stale => "stale",
            CallStatus::Coalesced => "coalesced",
        }
    }

    /// Whether the value came from the cache without waiting on a producer.
    #[inline]
    pub const fn is_cached(&self) -> bool {
        matches!(self, CallStatus::Hit | CallStatus::Stale)
    }
}
