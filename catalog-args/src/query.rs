//! Splitting of `name?key=value&...` identifiers.
//!
//! Only the first `?` and the first `=` of each pair are significant and
//! nothing is percent-decoded, so JSON values such as `{"a":"b=c"}` survive
//! untouched.

/// Splits an identifier into its name and optional query segment.
pub(crate) fn split_identifier(identifier: &str) -> (&str, Option<&str>) {
    match identifier.split_once('?') {
        Some((name, query)) => (name, Some(query)),
        None => (identifier, None),
    }
}

/// Iterates over the `key[=value]` pairs of a query segment.
///
/// Empty segments (`a=1&&b=2`, trailing `&`) and empty keys are skipped.
/// A pair without `=` yields `None` as its value.
pub(crate) fn pairs(query: &str) -> impl Iterator<Item = (&str, Option<&str>)> {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (pair, None),
        })
        .filter(|(key, _)| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name_only() {
        assert_eq!(split_identifier("yts"), ("yts", None));
    }

    #[test]
    fn test_split_empty_query() {
        assert_eq!(split_identifier("yts?"), ("yts", Some("")));
        assert_eq!(pairs("").count(), 0);
    }

    #[test]
    fn test_split_on_first_question_mark() {
        assert_eq!(split_identifier("a?b=?c"), ("a", Some("b=?c")));
    }

    #[test]
    fn test_pairs_first_equals_wins() {
        let parsed: Vec<_> = pairs(r#"key1=["value1"]&filter={"q":"a=b"}&flag"#).collect();
        assert_eq!(
            parsed,
            vec![
                ("key1", Some(r#"["value1"]"#)),
                ("filter", Some(r#"{"q":"a=b"}"#)),
                ("flag", None),
            ]
        );
    }

    #[test]
    fn test_pairs_skip_empty_segments() {
        let parsed: Vec<_> = pairs("a=1&&=2&b=").collect();
        assert_eq!(parsed, vec![("a", Some("1")), ("b", Some(""))]);
    }
}
