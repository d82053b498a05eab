//! Static kind tables shared by every provider.
//!
//! Serialized names match the values exchanged with existing provider
//! configurations and front-ends.

use serde::{Deserialize, Serialize};

/// Kind of catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    /// A single movie.
    #[serde(rename = "movie")]
    Movie,
    /// A TV show with seasons and episodes.
    #[serde(rename = "tvshow")]
    TvShow,
}

/// Sort direction. "No ordering" is expressed as `Option::<OrderType>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Field to sort by. "No sorter" is expressed as `Option::<SorterType>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SorterType {
    /// Sort by title.
    Name,
    /// Sort by rating.
    Rating,
    /// Sort by popularity.
    Popularity,
}

/// Stream quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QualityType {
    /// Whatever the source considers its default.
    #[default]
    #[serde(rename = "0")]
    Default,
    /// 480p.
    #[serde(rename = "480p")]
    Low,
    /// 720p.
    #[serde(rename = "720p")]
    Medium,
    /// 1080p.
    #[serde(rename = "1080p")]
    High,
}

macro_rules! wire_names {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Returns the serialized name.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_names!(ItemType { Movie => "movie", TvShow => "tvshow" });
wire_names!(OrderType { Asc => "asc", Desc => "desc" });
wire_names!(SorterType { Name => "name", Rating => "rating", Popularity => "popularity" });
wire_names!(QualityType { Default => "0", Low => "480p", Medium => "720p", High => "1080p" });

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serde_names_match_as_str() {
        for kind in [ItemType::Movie, ItemType::TvShow] {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
        for quality in [
            QualityType::Default,
            QualityType::Low,
            QualityType::Medium,
            QualityType::High,
        ] {
            assert_eq!(serde_json::to_value(quality).unwrap(), json!(quality.as_str()));
        }
        assert_eq!(serde_json::to_value(SorterType::Popularity).unwrap(), json!("popularity"));
        assert_eq!(serde_json::to_value(OrderType::Desc).unwrap(), json!("desc"));
    }

    #[test]
    fn test_null_order_is_none() {
        let order: Option<OrderType> = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(order, None);
    }
}
