use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use catalog_args::{ArgumentSource, Arguments};
use catalog_core::{CallStatus, Filters, GateLabel, Item, Page, SystemTimeProvider, TimeProvider};
use catalog_gate::Gate;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::filters::FilterTable;
use crate::identifier::provider_id;
use crate::producer::{DetailProducer, DetailRequest, FetchProducer};
use crate::source::{Catalog, Source};

/// Construction stage of a [`Provider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    /// Nothing done yet.
    Uninitialized,
    /// Filters merged, arguments being decoded.
    DecodingArgs,
    /// Arguments decoded, gates being built.
    BuildingGates,
    /// Ready to serve calls.
    Ready,
}

impl ProviderState {
    fn enter(self, name: &str) -> Self {
        debug!(provider = name, state = ?self, "Provider state");
        self
    }

    fn advance(self, name: &str) -> Self {
        let next = match self {
            ProviderState::Uninitialized => ProviderState::DecodingArgs,
            ProviderState::DecodingArgs => ProviderState::BuildingGates,
            ProviderState::BuildingGates | ProviderState::Ready => ProviderState::Ready,
        };
        next.enter(name)
    }
}

/// Gate memoizing `Source::fetch`.
pub type FetchGate<S> = Gate<Filters, FetchProducer<S>>;

/// Gate memoizing `Source::detail`.
pub type DetailGate<S> = Gate<DetailRequest, DetailProducer<S>>;

/// A configured content source with memoized `fetch` and `detail`.
///
/// ```
/// use catalog_args::ArgType;
/// use catalog_core::{Filters, Page};
/// use catalog_provider::{Provider, ProviderConfig, Source, SourceError, async_trait};
/// use serde_json::json;
///
/// struct Static;
///
/// #[async_trait]
/// impl Source for Static {
///     async fn fetch(&self, _filters: Filters) -> Result<Page, SourceError> {
///         Ok(Page::new(vec![json!({"id": 1})], false))
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), catalog_provider::ProviderError> {
/// let provider = Provider::<Static>::builder(ProviderConfig::new("static").arg("limit", ArgType::Number))
///     .identifier("static?limit=5")
///     .build(Static)?;
///
/// let page = provider.fetch(Filters::new()).await?;
/// assert_eq!(provider.extract_ids(&page), vec![json!(1)]);
/// # Ok(())
/// # }
/// ```
pub struct Provider<S: Source> {
    id: String,
    name: String,
    config: ProviderConfig,
    args: Arguments,
    filters: FilterTable,
    source: Arc<S>,
    fetch_gate: FetchGate<S>,
    detail_gate: DetailGate<S>,
    state: ProviderState,
}

/// Builder for [`Provider`].
pub struct ProviderBuilder {
    config: ProviderConfig,
    identifier: Result<ArgumentSource, ProviderError>,
    time: Arc<dyn TimeProvider>,
}

impl ProviderBuilder {
    /// Decode arguments from `identifier` (`name?key=value&...` or a map).
    pub fn identifier(self, identifier: impl Into<ArgumentSource>) -> Self {
        Self {
            identifier: Ok(identifier.into()),
            ..self
        }
    }

    /// Decode arguments from a JSON configuration value.
    ///
    /// Anything but a string, an object or `null` makes [`build`](Self::build)
    /// fail with [`ProviderError::InvalidArgumentShape`].
    pub fn identifier_value(self, identifier: Value) -> Self {
        Self {
            identifier: ArgumentSource::try_from(identifier).map_err(ProviderError::from),
            ..self
        }
    }

    /// Set the clock used by both gates.
    pub fn time_provider(self, time: impl TimeProvider + 'static) -> Self {
        Self {
            time: Arc::new(time),
            ..self
        }
    }

    /// Build a provider around `source`.
    pub fn build<S: Source>(self, source: S) -> Result<Provider<S>, ProviderError> {
        self.build_with(|_| source)
    }

    /// Build a provider around the source returned by `make_source`, which
    /// receives the decoded arguments.
    pub fn build_with<S, F>(self, make_source: F) -> Result<Provider<S>, ProviderError>
    where
        S: Source,
        F: FnOnce(&Arguments) -> S,
    {
        let ProviderBuilder {
            config,
            identifier,
            time,
        } = self;
        let identifier = identifier?;

        let mut state = ProviderState::Uninitialized.enter(&config.name);
        let filters = FilterTable::defaults().merged(&config.filters);

        state = state.advance(&config.name);
        let args = config.schema().decode(identifier);
        let name = if config.name.is_empty() {
            args.name().unwrap_or("provider").to_owned()
        } else {
            config.name.clone()
        };
        let id = provider_id(&name, &args);

        state = state.advance(&name);
        let source = Arc::new(make_source(&args));
        let label = GateLabel::new(id.as_str());
        let fetch_gate = Gate::builder(FetchProducer::new(source.clone()))
            .label(label.compose(&GateLabel::new("fetch")))
            .policy(config.fetch_cache)
            .time_provider(time.clone())
            .build();
        let detail_gate = Gate::builder(DetailProducer::new(source.clone()))
            .label(label.compose(&GateLabel::new("detail")))
            .policy(config.detail_cache)
            .time_provider(time)
            .build();

        state = state.advance(&name);

        Ok(Provider {
            id,
            name,
            config,
            args,
            filters,
            source,
            fetch_gate,
            detail_gate,
            state,
        })
    }
}

impl<S: Source> Provider<S> {
    /// Starts building a provider from `config`. Without an identifier the
    /// provider is built from the configured defaults alone.
    pub fn builder(config: ProviderConfig) -> ProviderBuilder {
        ProviderBuilder {
            config,
            identifier: Ok(ArgumentSource::default()),
            time: Arc::new(SystemTimeProvider),
        }
    }

    /// Fetches a page, memoized per filters.
    pub async fn fetch(&self, filters: Filters) -> Result<Page, ProviderError> {
        Ok(self.fetch_gate.call(filters).await?)
    }

    /// Like [`fetch`](Self::fetch), also reporting how the call was answered.
    pub async fn fetch_with_status(
        &self,
        filters: Filters,
    ) -> Result<(Page, CallStatus), ProviderError> {
        Ok(self.fetch_gate.call_with_status(filters).await?)
    }

    /// Completes `partial` with details, memoized per id and partial item.
    pub async fn detail(&self, id: &str, partial: Item) -> Result<Item, ProviderError> {
        let request = DetailRequest {
            id: id.to_owned(),
            partial,
        };
        Ok(self.detail_gate.call(request).await?)
    }

    /// Picks a random item and returns its details.
    pub async fn random(&self) -> Result<Item, ProviderError> {
        self.source.random(self).await
    }

    /// Unique ids of the items of `page`.
    pub fn extract_ids(&self, page: &Page) -> Vec<Value> {
        self.source.extract_ids(page, &self.config.unique_id)
    }

    /// Turns a stream locator into a playable one.
    pub fn resolve_stream(&self, source: Value) -> Value {
        self.source.resolve_stream(source)
    }

    /// Stable id derived from the name and the decoded arguments.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Provider name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded arguments.
    pub fn args(&self) -> &Arguments {
        &self.args
    }

    /// Filter catalogs, built-in ones merged with the configured overrides.
    pub fn filters(&self) -> &FilterTable {
        &self.filters
    }

    /// The configuration the provider was built from.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Construction stage; always [`ProviderState::Ready`] once built.
    pub fn state(&self) -> ProviderState {
        self.state
    }

    /// The gate memoizing `fetch`.
    pub fn fetch_gate(&self) -> &FetchGate<S> {
        &self.fetch_gate
    }

    /// The gate memoizing `detail`.
    pub fn detail_gate(&self) -> &DetailGate<S> {
        &self.detail_gate
    }
}

#[async_trait]
impl<S: Source> Catalog for Provider<S> {
    fn unique_id(&self) -> &str {
        &self.config.unique_id
    }

    async fn fetch(&self, filters: Filters) -> Result<Page, ProviderError> {
        Provider::fetch(self, filters).await
    }

    async fn detail(&self, id: &str, partial: Item) -> Result<Item, ProviderError> {
        Provider::detail(self, id, partial).await
    }
}

impl<S: Source> fmt::Display for Provider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = json!({
            "id": self.id,
            "name": self.name,
            "args": self.args,
            "filters": self.filters,
            "uniqueId": self.config.unique_id,
        });
        write!(f, "{summary}")
    }
}

impl<S: Source> fmt::Debug for Provider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id)
            .field("args", &self.args)
            .field("state", &self.state)
            .field("fetch_gate", &self.fetch_gate)
            .field("detail_gate", &self.detail_gate)
            .finish_non_exhaustive()
    }
}
