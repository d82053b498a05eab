//! Filter catalogs offered to users (genres, sorters).
//!
//! Every provider starts from the built-in catalogs and may replace any of
//! them, or add new ones, through its configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Values of one filter catalog: wire value to display label.
pub type FilterCatalog = IndexMap<String, String>;

/// Name of the genre catalog.
pub const GENRES: &str = "genres";

/// Name of the sorter catalog.
pub const SORTERS: &str = "sorters";

/// Built-in genre catalog.
pub const DEFAULT_GENRES: &[(&str, &str)] = &[
    ("all", "All"),
    ("action", "Action"),
    ("adventure", "Adventure"),
    ("animation", "Animation"),
    ("biography", "Biography"),
    ("comedy", "Comedy"),
    ("crime", "Crime"),
    ("documentary", "Documentary"),
    ("drama", "Drama"),
    ("family", "Family"),
    ("fantasy", "Fantasy"),
    ("filmNoir", "Film-Noir"),
    ("history", "History"),
    ("horror", "Horror"),
    ("music", "Music"),
    ("musical", "Musical"),
    ("mystery", "Mystery"),
    ("romance", "Romance"),
    ("sciFi", "Sci-Fi"),
    ("short", "Short"),
    ("sport", "Sport"),
    ("thriller", "Thriller"),
    ("war", "War"),
    ("western", "Western"),
];

/// Built-in sorter catalog.
pub const DEFAULT_SORTERS: &[(&str, &str)] = &[
    ("popularity", "Popularity"),
    ("trending", "Trending"),
    ("lastAdded", "Last Added"),
    ("year", "Year"),
    ("title", "Title"),
    ("rating", "Rating"),
];

/// Filter catalogs by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterTable(IndexMap<String, FilterCatalog>);

impl FilterTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in `genres` and `sorters` catalogs.
    pub fn defaults() -> Self {
        Self::new()
            .with_catalog(GENRES, DEFAULT_GENRES)
            .with_catalog(SORTERS, DEFAULT_SORTERS)
    }

    /// Adds or replaces the catalog `name`.
    pub fn with_catalog(mut self, name: impl Into<String>, entries: &[(&str, &str)]) -> Self {
        let catalog = entries
            .iter()
            .map(|(value, label)| ((*value).to_owned(), (*label).to_owned()))
            .collect();
        self.0.insert(name.into(), catalog);
        self
    }

    /// Returns a table where every catalog of `overrides` replaces the
    /// catalog of the same name. Catalogs are never merged entry by entry.
    pub fn merged(&self, overrides: &FilterTable) -> FilterTable {
        let mut table = self.0.clone();
        table.extend(
            overrides
                .0
                .iter()
                .map(|(name, catalog)| (name.clone(), catalog.clone())),
        );
        FilterTable(table)
    }

    /// Returns the catalog `name`.
    pub fn get(&self, name: &str) -> Option<&FilterCatalog> {
        self.0.get(name)
    }

    /// The genre catalog.
    pub fn genres(&self) -> Option<&FilterCatalog> {
        self.get(GENRES)
    }

    /// The sorter catalog.
    pub fn sorters(&self) -> Option<&FilterCatalog> {
        self.get(SORTERS)
    }

    /// Iterates over catalogs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterCatalog)> {
        self.0.iter()
    }

    /// Number of catalogs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no catalogs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let table = FilterTable::defaults();
        assert_eq!(table.genres().map(IndexMap::len), Some(24));
        assert_eq!(table.sorters().map(IndexMap::len), Some(6));
        assert_eq!(
            table.genres().and_then(|g| g.get("filmNoir")).map(String::as_str),
            Some("Film-Noir")
        );
    }

    #[test]
    fn test_merge_replaces_whole_catalog() {
        let overrides = FilterTable::new()
            .with_catalog(SORTERS, &[("seeds", "Seeds")])
            .with_catalog("quality", &[("720p", "720p")]);

        let table = FilterTable::defaults().merged(&overrides);

        assert_eq!(table.len(), 3);
        assert_eq!(table.genres().map(IndexMap::len), Some(24));
        let sorters: Vec<_> = table.sorters().unwrap().keys().cloned().collect();
        assert_eq!(sorters, vec!["seeds".to_string()]);
        assert!(table.get("quality").is_some());
        assert_eq!(
            FilterTable::defaults().sorters().map(IndexMap::len),
            Some(6),
            "defaults are never mutated"
        );
    }
}
