//! Gate labels.

use smol_str::SmolStr;
use std::fmt;

/// Name of a gate.
///
/// Prefixes the gate's cache keys and tags its log lines and metrics.
/// Providers scope their two gates under their own id:
///
/// ```
/// use catalog_core::GateLabel;
///
/// let provider = GateLabel::new("yts_1f2e3d4c5b6a7988");
/// let fetch = provider.compose(&GateLabel::new_static("fetch"));
/// assert_eq!(fetch.as_str(), "yts_1f2e3d4c5b6a7988.fetch");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GateLabel(SmolStr);

impl GateLabel {
    /// Label from any string.
    pub fn new(label: impl Into<SmolStr>) -> Self {
        Self(label.into())
    }

    /// Label from a static string, without allocating.
    pub const fn new_static(label: &'static str) -> Self {
        Self(SmolStr::new_static(label))
    }

    /// The label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The label text as a [`SmolStr`], cheap to clone into keys.
    pub fn as_smol_str(&self) -> &SmolStr {
        &self.0
    }

    /// `"{self}.{child}"`.
    pub fn compose(&self, child: &GateLabel) -> Self {
        Self(SmolStr::from(format!("{}.{}", self.0, child.0)))
    }
}

impl fmt::Display for GateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for GateLabel {
    fn from(label: &'static str) -> Self {
        Self::new_static(label)
    }
}

impl From<String> for GateLabel {
    fn from(label: String) -> Self {
        Self(SmolStr::from(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composed_labels_nest() {
        let label = GateLabel::new("yts").compose(&"fetch".into());
        assert_eq!(label.to_string(), "yts.fetch");
        assert_eq!(label.compose(&"refresh".into()).as_str(), "yts.fetch.refresh");
    }
}
