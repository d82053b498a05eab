//! The contract concrete content sources implement.

use async_trait::async_trait;
use catalog_core::{Filters, Item, Page};
use rand::seq::IndexedRandom;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ProviderError, SourceError};

/// The gated view of a provider.
///
/// Handed to [`Source::random`] so that the default implementation goes
/// through the same memoized `fetch` and `detail` as every other caller.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Item field holding the unique id.
    fn unique_id(&self) -> &str;

    /// Fetches a page through the cache.
    async fn fetch(&self, filters: Filters) -> Result<Page, ProviderError>;

    /// Fetches item details through the cache.
    async fn detail(&self, id: &str, partial: Item) -> Result<Item, ProviderError>;
}

/// A content source: the part of a provider that talks to a backend.
///
/// Only [`fetch`](Source::fetch) is needed for a working source. Every other
/// method has a default body built on top of it.
///
/// # Examples
///
/// ```
/// use catalog_core::{Filters, Page};
/// use catalog_provider::{Source, SourceError, async_trait};
/// use serde_json::json;
///
/// struct Static;
///
/// #[async_trait]
/// impl Source for Static {
///     async fn fetch(&self, _filters: Filters) -> Result<Page, SourceError> {
///         Ok(Page::new(vec![json!({"id": 1, "title": "Metropolis"})], false))
///     }
/// }
/// ```
#[async_trait]
pub trait Source: Send + Sync + 'static {
    /// Fetches one page of items matching `filters`.
    ///
    /// The default body fails with [`SourceError::NotImplemented`].
    async fn fetch(&self, filters: Filters) -> Result<Page, SourceError> {
        let _ = filters;
        Err(SourceError::NotImplemented { method: "fetch" })
    }

    /// Completes `partial`, an item as returned by `fetch`, with details.
    ///
    /// The default body returns `partial` unchanged.
    async fn detail(&self, id: &str, partial: Item) -> Result<Item, SourceError> {
        warn!(
            id,
            "Using the default detail implementation, override it for better performing fetch and detail calls"
        );
        Ok(partial)
    }

    /// Picks a random item and returns its details.
    ///
    /// The default body is [`random_item`].
    async fn random(&self, catalog: &dyn Catalog) -> Result<Item, ProviderError> {
        warn!("Using the default random implementation, override it for a faster random");
        random_item(catalog).await
    }

    /// Projects the unique id field out of every item of `page`.
    fn extract_ids(&self, page: &Page, unique_id: &str) -> Vec<Value> {
        extract_ids(page, unique_id)
    }

    /// Turns a stream locator into a playable one.
    ///
    /// The default body returns `source` unchanged.
    fn resolve_stream(&self, source: Value) -> Value {
        debug!("Using the default resolve_stream implementation");
        source
    }
}

/// Fetches an unfiltered page, picks one item uniformly and asks for its
/// details.
pub async fn random_item(catalog: &dyn Catalog) -> Result<Item, ProviderError> {
    let page = catalog.fetch(Filters::new()).await?;

    let item = {
        let mut rng = rand::rng();
        page.results.choose(&mut rng).cloned()
    }
    .ok_or(ProviderError::EmptyPage)?;

    let id = item_id(&item, catalog.unique_id()).ok_or_else(|| ProviderError::MissingUniqueId {
        field: catalog.unique_id().to_owned(),
    })?;

    catalog.detail(&id, item).await
}

/// Collects the `unique_id` field of every item of `page`, skipping items
/// without it.
pub fn extract_ids(page: &Page, unique_id: &str) -> Vec<Value> {
    page.results
        .iter()
        .filter_map(|item| match item.get(unique_id) {
            Some(id) if !id.is_null() => Some(id.clone()),
            _ => {
                warn!(unique_id, "Item without unique id skipped");
                None
            }
        })
        .collect()
}

/// The `unique_id` field of `item` as text.
///
/// Strings are returned as is, other values in their JSON form.
pub fn item_id(item: &Item, unique_id: &str) -> Option<String> {
    match item.get(unique_id)? {
        Value::Null => None,
        Value::String(id) => Some(id.clone()),
        other => Some(other.to_string()),
    }
}
