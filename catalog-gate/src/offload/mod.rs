//! Background execution of stale-while-revalidate refreshes.
//!
//! A gate serves a stale value immediately and hands the refresh to its
//! [`OffloadManager`]. Tasks are keyed by cache key, so a second refresh for
//! a key that is still being refreshed is skipped. Dropping the gate aborts
//! whatever is still running.

mod manager;
mod policy;

pub use manager::OffloadManager;
pub use policy::{OffloadConfig, OffloadConfigBuilder, TimeoutPolicy};
