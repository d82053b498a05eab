#![warn(missing_docs)]
//! # catalog-gate
//!
//! Time-bounded memoization of expensive asynchronous calls.
//!
//! A [`Gate`] wraps a [`Producer`] and answers calls from an in-memory
//! cache keyed by the call arguments:
//!
//! - **Hit** - a cached value younger than `ttl * refresh_fraction` is
//!   returned as is
//! - **Stale** - an older, still valid value is returned immediately while
//!   one background call refreshes it
//! - **Miss** - the producer is called; concurrent callers of the same key
//!   attach to that single call ([`CallStatus::Coalesced`])
//!
//! A failed producer call is delivered to every attached caller and evicts
//! the entry, so the next call tries again. A failed background refresh is
//! logged and keeps the cached value.
//!
//! ## Feature Flags
//!
//! - `metrics` - Record `catalog_gate_*` counters and histograms via the
//!   [`metrics`](https://docs.rs/metrics) crate

mod error;
mod gate;
mod key;
pub mod metrics;
pub mod offload;
mod policy;
mod slot;

pub use catalog_core::{CallStatus, Producer, TimeProvider, producer_fn};
pub use error::GateError;
pub use gate::{EntryState, Gate, GateBuilder};
pub use key::{JsonKey, KeyError, KeyFn};
pub use policy::{DEFAULT_TTL, GatePolicy, PolicyError, RefreshFraction};
