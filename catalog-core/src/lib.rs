#![warn(missing_docs)]
//! # catalog-core
//!
//! Core traits and types shared by the catalog provider crates.
//!
//! This crate holds the vocabulary that the argument decoder
//! (`catalog-args`), the memoized call gate (`catalog-gate`) and the
//! provider façade (`catalog-provider`) agree on:
//!
//! - **Keys** - [`CacheKey`] and [`KeyPart`] identify memoized calls
//! - **Values** - [`CacheValue`] carries data with refresh and expiry instants
//! - **Time** - [`TimeProvider`] abstracts the clock used for freshness checks
//! - **Producers** - [`Producer`] is the expensive async operation a gate wraps
//! - **Catalog data** - [`Item`], [`Page`] and [`Filters`] plus the static
//!   [`kinds`] tables
//!
//! ## Feature Flags
//!
//! - `test-helpers` - Enable [`MockTimeProvider`](time::MockTimeProvider)
//!

pub mod catalog;
pub mod json;
pub mod key;
pub mod kinds;
pub mod label;
pub mod producer;
pub mod status;
pub mod time;
pub mod value;

pub use catalog::{Filters, Item, Page};
pub use key::{CacheKey, KeyPart};
pub use kinds::{ItemType, OrderType, QualityType, SorterType};
pub use label::GateLabel;
pub use producer::{Producer, ProducerFn, producer_fn};
pub use status::CallStatus;
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use time::{SystemTimeProvider, TimeProvider};
pub use value::{CacheState, CacheValue};
