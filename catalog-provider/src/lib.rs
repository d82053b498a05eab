#![warn(missing_docs)]
//! # catalog-provider
//!
//! The contract content catalogs implement, and the [`Provider`] that wraps
//! one with decoded arguments and memoized calls.
//!
//! A concrete catalog implements [`Source`]; only `fetch` is required.
//! [`Provider::builder`] then:
//!
//! 1. merges the built-in genre and sorter catalogs with the configured ones
//! 2. decodes the configuration identifier (`"yts?limit=50"`) against the
//!    declared argument types
//! 3. derives a stable id from the name and the decoded arguments
//! 4. wraps `fetch` and `detail` in their own [`Gate`](catalog_gate::Gate)
//!
//! The default `random` goes through the gated `fetch` and `detail`, so a
//! source that only implements `fetch` is fully usable.
//!
//! ## Feature Flags
//!
//! - `metrics` - Record gate metrics (forwarded to `catalog-gate`)

mod config;
mod error;
mod filters;
mod identifier;
mod producer;
mod provider;
mod source;

pub use async_trait::async_trait;
pub use config::{DEFAULT_UNIQUE_ID, ProviderConfig};
pub use error::{BoxError, ProviderError, SourceError};
pub use filters::{
    DEFAULT_GENRES, DEFAULT_SORTERS, FilterCatalog, FilterTable, GENRES, SORTERS,
};
pub use identifier::provider_id;
pub use producer::{DetailProducer, DetailRequest, FetchProducer};
pub use provider::{DetailGate, FetchGate, Provider, ProviderBuilder, ProviderState};
pub use source::{Catalog, Source, extract_ids, item_id, random_item};
