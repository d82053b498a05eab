//! Catalog data exchanged between providers and their callers.
//!
//! Items are schemaless JSON documents: concrete sources decide which fields
//! they fill in, the toolkit only relies on the configured unique-id field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single catalog entry (movie, show, episode...).
pub type Item = Value;

/// Filters passed to a `fetch` call (page, genre, sorter, keywords...).
pub type Filters = Map<String, Value>;

/// One page of results returned by a `fetch` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Items on this page.
    #[serde(default)]
    pub results: Vec<Item>,
    /// Whether another page can be requested.
    #[serde(default, rename = "hasMore")]
    pub has_more: bool,
}

impl Page {
    /// Creates a page from its results.
    pub fn new(results: Vec<Item>, has_more: bool) -> Self {
        Self { results, has_more }
    }

    /// Number of items on the page.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the page has no items.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_page_uses_wire_field_names() {
        let page: Page = serde_json::from_value(json!({
            "results": [{"id": 1}],
            "hasMore": true
        }))
        .unwrap();

        assert_eq!(page, Page::new(vec![json!({"id": 1})], true));
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({"results": [{"id": 1}], "hasMore": true})
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let page: Page = serde_json::from_value(json!({})).unwrap();
        assert!(page.is_empty());
        assert!(!page.has_more);
    }
}
