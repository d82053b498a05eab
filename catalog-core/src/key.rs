//! Keys of memoized calls.
//!
//! A gate turns the arguments of a call into a [`CacheKey`]: its own label
//! as prefix plus the [`KeyPart`]s produced by its key function. Rendered,
//! a key reads `{prefix}:name=value&name=value`, which is what shows up in
//! logs.
//!
//! ```
//! use catalog_core::{CacheKey, KeyPart};
//!
//! let key = CacheKey::new("yts.detail", vec![KeyPart::new("id", Some("tt0017136"))]);
//! assert_eq!(key.to_string(), "yts.detail:id=tt0017136");
//!
//! let flag = CacheKey::new("", vec![KeyPart::new("all", None::<&str>)]);
//! assert_eq!(flag.to_string(), "all");
//! ```

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

#[derive(Debug, PartialEq, Eq, Hash)]
struct Parts {
    prefix: SmolStr,
    parts: Vec<KeyPart>,
}

/// Identifies one memoized call within a gate.
///
/// Cloning is a reference count bump: keys travel into in-flight calls and
/// refresh tasks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(Arc<Parts>);

impl CacheKey {
    /// Key made of `parts` under `prefix`.
    pub fn new(prefix: impl Into<SmolStr>, parts: Vec<KeyPart>) -> Self {
        CacheKey(Arc::new(Parts {
            prefix: prefix.into(),
            parts,
        }))
    }

    /// Unprefixed key with the single part `name=value`.
    pub fn single(name: &str, value: &str) -> Self {
        Self::new(SmolStr::default(), vec![KeyPart::new(name, Some(value))])
    }

    /// The same parts under `prefix`.
    pub fn with_prefix(&self, prefix: impl Into<SmolStr>) -> Self {
        Self::new(prefix, self.0.parts.clone())
    }

    /// Key parts in order.
    pub fn parts(&self) -> &[KeyPart] {
        &self.0.parts
    }

    /// Prefix, empty when none.
    pub fn prefix(&self) -> &str {
        &self.0.prefix
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.0.prefix.is_empty() {
            write!(f, "{}:", self.0.prefix)?;
        }
        let mut separator = "";
        for part in &self.0.parts {
            write!(f, "{separator}{part}")?;
            separator = "&";
        }
        Ok(())
    }
}

/// `name=value` component of a [`CacheKey`]. Flags have no value.
///
/// ```
/// use catalog_core::KeyPart;
///
/// let part = KeyPart::new("args", Some(r#"{"page":1}"#));
/// assert_eq!(part.name(), "args");
/// assert_eq!(part.value(), Some(r#"{"page":1}"#));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyPart {
    name: SmolStr,
    value: Option<SmolStr>,
}

impl KeyPart {
    /// Part `name`, with `value` if any.
    pub fn new(name: impl AsRef<str>, value: Option<impl AsRef<str>>) -> Self {
        KeyPart {
            name: SmolStr::new(name),
            value: value.map(SmolStr::new),
        }
    }

    /// Part name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Part value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}
