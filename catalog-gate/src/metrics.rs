//! Metrics declaration and recording.
//!
//! Every recorder is a no-op unless the `metrics` feature is enabled.

use std::time::Duration;

use catalog_core::{CallStatus, GateLabel};

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Call status metrics

    /// Track number of calls answered from a fresh entry.
    pub static ref GATE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "catalog_gate_hit_total",
            "Total number of calls answered from a fresh entry."
        );
        "catalog_gate_hit_total"
    };
    /// Track number of calls that invoked the producer.
    pub static ref GATE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "catalog_gate_miss_total",
            "Total number of calls that invoked the producer."
        );
        "catalog_gate_miss_total"
    };
    /// Track number of calls answered from a stale entry.
    pub static ref GATE_STALE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "catalog_gate_stale_total",
            "Total number of calls answered from a stale entry while refreshing."
        );
        "catalog_gate_stale_total"
    };
    /// Track number of calls attached to an in-flight call.
    pub static ref GATE_COALESCED_COUNTER: &'static str = {
        metrics::describe_counter!(
            "catalog_gate_coalesced_total",
            "Total number of calls attached to an in-flight producer call."
        );
        "catalog_gate_coalesced_total"
    };

    // Producer metrics

    /// Histogram of producer call duration.
    pub static ref GATE_PRODUCER_DURATION: &'static str = {
        metrics::describe_histogram!(
            "catalog_gate_producer_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of producer calls in seconds."
        );
        "catalog_gate_producer_duration_seconds"
    };
    /// Track number of failed producer calls.
    pub static ref GATE_PRODUCER_ERRORS: &'static str = {
        metrics::describe_counter!(
            "catalog_gate_producer_errors_total",
            "Total number of failed producer calls."
        );
        "catalog_gate_producer_errors_total"
    };
    /// Track number of entries removed to respect the entry bound.
    pub static ref GATE_EVICTIONS: &'static str = {
        metrics::describe_counter!(
            "catalog_gate_evictions_total",
            "Total number of entries evicted to respect max_entries."
        );
        "catalog_gate_evictions_total"
    };

    // Offload manager metrics

    /// Track number of refreshes spawned.
    pub static ref OFFLOAD_TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "catalog_gate_refresh_spawned_total",
            "Total number of background refreshes spawned."
        );
        "catalog_gate_refresh_spawned_total"
    };
    /// Track number of refreshes skipped because one was in flight.
    pub static ref OFFLOAD_TASKS_DEDUPLICATED: &'static str = {
        metrics::describe_counter!(
            "catalog_gate_refresh_deduplicated_total",
            "Total number of background refreshes skipped because one was already in flight."
        );
        "catalog_gate_refresh_deduplicated_total"
    };
    /// Track number of refreshes aborted by the timeout policy.
    pub static ref OFFLOAD_TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "catalog_gate_refresh_timeout_total",
            "Total number of background refreshes that timed out."
        );
        "catalog_gate_refresh_timeout_total"
    };
    /// Histogram of refresh duration.
    pub static ref OFFLOAD_TASK_DURATION: &'static str = {
        metrics::describe_histogram!(
            "catalog_gate_refresh_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of background refreshes in seconds."
        );
        "catalog_gate_refresh_duration_seconds"
    };
}

/// Record the status of a finished call.
#[cfg(feature = "metrics")]
#[inline]
pub fn call(label: &GateLabel, status: CallStatus) {
    let counter = match status {
        CallStatus::Hit => *GATE_HIT_COUNTER,
        CallStatus::Miss => *GATE_MISS_COUNTER,
        CallStatus::Stale => *GATE_STALE_COUNTER,
        CallStatus::Coalesced => *GATE_COALESCED_COUNTER,
    };
    metrics::counter!(counter, "gate" => label.to_string()).increment(1);
}

/// Record a settled producer call.
#[cfg(feature = "metrics")]
#[inline]
pub fn producer(label: &GateLabel, duration: Duration, failed: bool) {
    metrics::histogram!(*GATE_PRODUCER_DURATION, "gate" => label.to_string())
        .record(duration.as_secs_f64());
    if failed {
        metrics::counter!(*GATE_PRODUCER_ERRORS, "gate" => label.to_string()).increment(1);
    }
}

/// Record an entry evicted to respect the entry bound.
#[cfg(feature = "metrics")]
#[inline]
pub fn eviction(label: &GateLabel) {
    metrics::counter!(*GATE_EVICTIONS, "gate" => label.to_string()).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn offload_spawned(label: &GateLabel) {
    metrics::counter!(*OFFLOAD_TASKS_SPAWNED, "gate" => label.to_string()).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn offload_deduplicated(label: &GateLabel) {
    metrics::counter!(*OFFLOAD_TASKS_DEDUPLICATED, "gate" => label.to_string()).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn offload_timeout(label: &GateLabel) {
    metrics::counter!(*OFFLOAD_TASKS_TIMEOUT, "gate" => label.to_string()).increment(1);
}

#[cfg(feature = "metrics")]
#[inline]
pub(crate) fn offload_completed(label: &GateLabel, duration: Duration) {
    metrics::histogram!(*OFFLOAD_TASK_DURATION, "gate" => label.to_string())
        .record(duration.as_secs_f64());
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn call(_label: &GateLabel, _status: CallStatus) {}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn producer(_label: &GateLabel, _duration: Duration, _failed: bool) {}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn eviction(_label: &GateLabel) {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn offload_spawned(_label: &GateLabel) {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn offload_deduplicated(_label: &GateLabel) {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn offload_timeout(_label: &GateLabel) {}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn offload_completed(_label: &GateLabel, _duration: Duration) {}
