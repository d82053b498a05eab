use catalog_args::{ArgType, ArgumentSchema, BooleanCoercion};
use catalog_gate::GatePolicy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::filters::FilterTable;

/// Field holding the item id unless configured otherwise.
pub const DEFAULT_UNIQUE_ID: &str = "id";

fn default_unique_id() -> String {
    DEFAULT_UNIQUE_ID.to_owned()
}

/// Static configuration of a provider.
///
/// ```yaml
/// name: yts
/// arg_types:
///   limit: NUMBER
///   genres: ARRAY
/// defaults:
///   limit: 50
/// filters:
///   sorters:
///     seeds: Seeds
/// unique_id: imdb_id
/// fetch_cache:
///   ttl: 10m
///   refresh_fraction: 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name. When empty, the identifier's name segment is used.
    #[serde(default)]
    pub name: String,
    /// Declared argument types.
    #[serde(default)]
    pub arg_types: IndexMap<String, ArgType>,
    /// Argument defaults.
    #[serde(default)]
    pub defaults: Map<String, Value>,
    /// Filter catalogs replacing or extending the built-in ones.
    #[serde(default)]
    pub filters: FilterTable,
    /// Item field holding the unique id.
    #[serde(default = "default_unique_id")]
    pub unique_id: String,
    /// Boolean argument coercion.
    #[serde(default)]
    pub boolean_coercion: BooleanCoercion,
    /// Memoization of `fetch`.
    #[serde(default)]
    pub fetch_cache: GatePolicy,
    /// Memoization of `detail`.
    #[serde(default)]
    pub detail_cache: GatePolicy,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            arg_types: IndexMap::new(),
            defaults: Map::new(),
            filters: FilterTable::new(),
            unique_id: default_unique_id(),
            boolean_coercion: BooleanCoercion::default(),
            fetch_cache: GatePolicy::default(),
            detail_cache: GatePolicy::default(),
        }
    }
}

impl ProviderConfig {
    /// Configuration named `name` with every other field defaulted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProviderError> {
        serde_saphyr::from_str(yaml).map_err(|err| ProviderError::Config(err.to_string()))
    }

    /// Declares argument `name` with type `ty`.
    pub fn arg(mut self, name: impl Into<String>, ty: ArgType) -> Self {
        self.arg_types.insert(name.into(), ty);
        self
    }

    /// Sets the default value of argument `name`.
    pub fn default_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(name.into(), value);
        self
    }

    /// Sets the filter overrides.
    pub fn filters(self, filters: FilterTable) -> Self {
        Self { filters, ..self }
    }

    /// Sets the unique id field.
    pub fn unique_id(self, unique_id: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            ..self
        }
    }

    /// Sets the memoization policy of `fetch`.
    pub fn fetch_cache(self, fetch_cache: GatePolicy) -> Self {
        Self {
            fetch_cache,
            ..self
        }
    }

    /// Sets the memoization policy of `detail`.
    pub fn detail_cache(self, detail_cache: GatePolicy) -> Self {
        Self {
            detail_cache,
            ..self
        }
    }

    /// The argument schema described by this configuration.
    pub fn schema(&self) -> ArgumentSchema {
        ArgumentSchema {
            arg_types: self.arg_types.clone(),
            defaults: self.defaults.clone(),
            boolean_coercion: self.boolean_coercion,
        }
    }
}
