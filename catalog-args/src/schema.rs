use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::NAME_KEY;
use crate::arguments::Arguments;
use crate::coerce;
use crate::error::{DecodeDiagnostic, DecodeFieldError};
use crate::query;
use crate::source::ArgumentSource;
use crate::types::{ArgType, BooleanCoercion};

/// Declared argument types and default values of a provider.
///
/// Deserializes from the same shape providers are configured with:
///
/// ```yaml
/// arg_types:
///   limit: NUMBER
///   genres: ARRAY
/// defaults:
///   limit: 20
/// boolean_coercion: truthy
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    /// Declared type per argument name.
    #[serde(default)]
    pub arg_types: IndexMap<String, ArgType>,
    /// Values used when the identifier does not set the argument.
    #[serde(default)]
    pub defaults: Map<String, Value>,
    /// Boolean coercion rule.
    #[serde(default)]
    pub boolean_coercion: BooleanCoercion,
}

/// Result of [`ArgumentSchema::decode_with_diagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The decoded arguments.
    pub arguments: Arguments,
    /// Fields that were dropped or are missing, in discovery order.
    pub diagnostics: Vec<DecodeDiagnostic>,
}

impl ArgumentSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` with type `ty`.
    pub fn arg(mut self, name: impl Into<String>, ty: ArgType) -> Self {
        self.arg_types.insert(name.into(), ty);
        self
    }

    /// Sets the default value of `name`.
    pub fn default_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(name.into(), value);
        self
    }

    /// Sets the boolean coercion rule.
    pub fn boolean_coercion(self, boolean_coercion: BooleanCoercion) -> Self {
        Self {
            boolean_coercion,
            ..self
        }
    }

    /// Declared type of `key`, [`ArgType::Unknown`] when undeclared.
    pub fn arg_type(&self, key: &str) -> ArgType {
        self.arg_types.get(key).copied().unwrap_or_default()
    }

    /// Coerces one raw value to `ty` using this schema's boolean rule.
    pub fn coerce(&self, ty: ArgType, raw: &str) -> Result<Value, DecodeFieldError> {
        coerce::coerce(ty, Some(raw), self.boolean_coercion)
    }

    /// Decodes `source`, logging every diagnostic.
    ///
    /// Never fails: fields that cannot be decoded are left out.
    pub fn decode(&self, source: impl Into<ArgumentSource>) -> Arguments {
        self.decode_with_diagnostics(source).arguments
    }

    /// Decodes `source` and returns the diagnostics alongside the arguments.
    ///
    /// Merge order, lowest precedence first: defaults, the identifier's name,
    /// the identifier's fields (or the passed map). Among repeated keys the
    /// last occurrence wins; when that occurrence fails to decode the key
    /// falls back to its default, if any.
    pub fn decode_with_diagnostics(&self, source: impl Into<ArgumentSource>) -> Decoded {
        let mut diagnostics = Vec::new();
        let mut merged = self.defaults.clone();

        match source.into() {
            ArgumentSource::Map(map) => merged.extend(map),
            ArgumentSource::Identifier(identifier) => {
                let (name, query) = query::split_identifier(&identifier);
                merged.insert(NAME_KEY.to_owned(), Value::String(name.to_owned()));

                let mut parsed = Map::new();
                for (key, raw) in query.into_iter().flat_map(query::pairs) {
                    let ty = self.arg_type(key);
                    match coerce::coerce(ty, raw, self.boolean_coercion) {
                        Ok(value) => {
                            parsed.insert(key.to_owned(), value);
                        }
                        Err(source) => {
                            parsed.remove(key);
                            diagnostics.push(DecodeDiagnostic::Field {
                                key: key.to_owned(),
                                ty,
                                source,
                            });
                        }
                    }
                }
                merged.extend(parsed);
            }
        }

        let arguments = Arguments::from_map(merged);
        diagnostics.extend(
            self.arg_types
                .keys()
                .filter(|key| !arguments.contains(key))
                .map(|key| DecodeDiagnostic::MissingRequiredField { key: key.clone() }),
        );

        for diagnostic in &diagnostics {
            warn!(key = diagnostic.key(), "{}", diagnostic);
        }
        debug!(
            args = arguments.len(),
            diagnostics = diagnostics.len(),
            "Provider arguments decoded"
        );

        Decoded {
            arguments,
            diagnostics,
        }
    }
}
