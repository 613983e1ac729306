use std::sync::LazyLock;

use regex::Regex;

use crate::predicate::Predicate;

static TERMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]+)"|(\S+)"#).expect("term pattern compiles")
});

static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s{2,}").expect("whitespace pattern compiles")
});

/// Split a query string into individual terms, grouping double-quoted
/// phrases together and collapsing redundant whitespace.
///
/// ```
/// use dynsearch::normalize_query;
///
/// assert_eq!(
///     normalize_query(r#"  some random  words "with   quotes  " and   spaces"#),
///     vec!["some", "random", "words", "with quotes", "and", "spaces"],
/// );
/// ```
pub fn normalize_query(query: &str) -> Vec<String> {
    TERMS
        .captures_iter(query)
        .filter_map(|capture| {
            let raw = capture.get(1).or_else(|| capture.get(2))?.as_str();
            let term =
                SPACE_RUNS.replace_all(raw.trim(), " ").into_owned();
            (!term.is_empty()).then_some(term)
        })
        .collect()
}

/// Build one predicate per term, each the OR of a case-insensitive
/// substring test of that term against every attribute in
/// `attributes`. The predicates are intersected downstream, so a row
/// survives a field's search only when every term matches it.
pub fn assemble_query(
    terms: &[String],
    attributes: &[&str],
) -> Vec<Predicate> {
    terms
        .iter()
        .map(|term| {
            Predicate::or_all(
                attributes
                    .iter()
                    .map(|attribute| {
                        Predicate::contains(*attribute, term.clone())
                    })
                    .collect(),
            )
        })
        .collect()
}
