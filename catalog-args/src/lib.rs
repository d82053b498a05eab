#![warn(missing_docs)]
//! # catalog-args
//!
//! Typed argument decoder for catalog providers.
//!
//! Providers are configured with an identifier such as
//! `yts?limit=50&genres=["drama","crime"]&anime=1`. This crate turns that
//! flat string into typed [`Arguments`] driven by an [`ArgumentSchema`]
//! that declares an [`ArgType`] per key plus default values.
//!
//! Decoding never fails as a whole. A field that cannot be coerced to its
//! declared type is dropped and reported as a [`DecodeDiagnostic`]; a
//! declared key that ends up without a value is reported too. The only hard
//! error is an identifier of the wrong shape ([`ArgsError::InvalidArgumentShape`]).
//!
//! ```
//! use catalog_args::{ArgType, ArgumentSchema};
//! use serde_json::json;
//!
//! let schema = ArgumentSchema::new()
//!     .arg("limit", ArgType::Number)
//!     .arg("genres", ArgType::Array)
//!     .default_value("limit", json!(20));
//!
//! let args = schema.decode("yts?genres=[\"drama\"]");
//!
//! assert_eq!(args.name(), Some("yts"));
//! assert_eq!(args.get_i64("limit"), Some(20));
//! assert_eq!(args.get("genres"), Some(&json!(["drama"])));
//! ```

mod arguments;
mod coerce;
mod error;
mod query;
mod schema;
mod source;
mod types;

pub use arguments::Arguments;
pub use error::{ArgsError, DecodeDiagnostic, DecodeFieldError};
pub use schema::{ArgumentSchema, Decoded};
pub use source::ArgumentSource;
pub use types::{ArgType, BooleanCoercion};

/// Key under which the identifier's name segment is stored.
pub const NAME_KEY: &str = "name";
