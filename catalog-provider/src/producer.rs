//! Adapters exposing source operations as gate producers.

use std::sync::Arc;

use catalog_core::{Filters, Item, Page, Producer};
use futures::future::BoxFuture;
use serde::Serialize;

use crate::error::SourceError;
use crate::source::Source;

/// `Source::fetch` as a producer keyed by the filters.
pub struct FetchProducer<S> {
    source: Arc<S>,
}

impl<S> FetchProducer<S> {
    pub(crate) fn new(source: Arc<S>) -> Self {
        Self { source }
    }
}

impl<S: Source> Producer<Filters> for FetchProducer<S> {
    type Output = Page;
    type Error = SourceError;
    type Future = BoxFuture<'static, Result<Page, SourceError>>;

    fn call(&self, filters: Filters) -> Self::Future {
        let source = self.source.clone();
        Box::pin(async move { source.fetch(filters).await })
    }
}

/// Arguments of a `detail` call. Both parts take part in the cache key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRequest {
    /// Item id.
    pub id: String,
    /// Item as known by the caller.
    pub partial: Item,
}

/// `Source::detail` as a producer keyed by id and partial item.
pub struct DetailProducer<S> {
    source: Arc<S>,
}

impl<S> DetailProducer<S> {
    pub(crate) fn new(source: Arc<S>) -> Self {
        Self { source }
    }
}

impl<S: Source> Producer<DetailRequest> for DetailProducer<S> {
    type Output = Item;
    type Error = SourceError;
    type Future = BoxFuture<'static, Result<Item, SourceError>>;

    fn call(&self, request: DetailRequest) -> Self::Future {
        let source = self.source.clone();
        Box::pin(async move { source.detail(&request.id, request.partial).await })
    }
}
