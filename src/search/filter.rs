use crate::error::{FollowDiffError, Result};
use regex::{Regex, RegexBuilder};

/// Compiled form of a search query.
#[derive(Debug, Clone)]
pub enum Matcher {
    All,
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    /// An empty query matches everything. A regex query is compiled
    /// case-insensitively; a literal one is lowercased.
    pub fn new(query: &str, use_regex: bool) -> Result<Self> {
        if query.is_empty() {
            return Ok(Matcher::All);
        }

        if use_regex {
            RegexBuilder::new(query)
                .case_insensitive(true)
                .build()
                .map(Matcher::Pattern)
                .map_err(|e| FollowDiffError::InvalidPattern {
                    pattern: query.to_string(),
                    message: e.to_string(),
                })
        } else {
            Ok(Matcher::Literal(query.to_lowercase()))
        }
    }

    /// `lowered` must already be lowercased.
    pub fn matches_lowered(&self, lowered: &str) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Literal(needle) => lowered.contains(needle.as_str()),
            Matcher::Pattern(pattern) => pattern.is_match(lowered),
        }
    }

    pub fn matches(&self, identifier: &str) -> bool {
        match self {
            Matcher::All => true,
            _ => self.matches_lowered(&identifier.to_lowercase()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Matcher::All)
    }
}

/// Borrowed subsequence of a result list, in the original order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredView<'a> {
    entries: Vec<&'a str>,
}

impl<'a> FilteredView<'a> {
    pub fn new(entries: Vec<&'a str>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.entries.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().copied()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.entries
    }

    pub fn to_owned_entries(&self) -> Vec<String> {
        self.entries.iter().map(|s| s.to_string()).collect()
    }
}

pub fn filter<'a, S: AsRef<str>>(
    results: &'a [S],
    query: &str,
    use_regex: bool,
) -> Result<FilteredView<'a>> {
    let matcher = Matcher::new(query, use_regex)?;
    Ok(FilteredView::new(
        results
            .iter()
            .map(AsRef::<str>::as_ref)
            .filter(|identifier| matcher.matches(identifier))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<String> {
        ["Alice_B", "bob", "carol.smith", "dave99", "eve_alice"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let results = results();
        let view = filter(&results, "", false).unwrap();
        assert_eq!(view.to_owned_entries(), results);

        let view = filter(&results, "", true).unwrap();
        assert_eq!(view.len(), results.len());
    }

    #[test]
    fn test_literal_is_case_insensitive() {
        let results = results();
        let view = filter(&results, "ALICE", false).unwrap();
        assert_eq!(view.as_slice(), &["Alice_B", "eve_alice"]);

        // Regex metacharacters are plain text in literal mode.
        let view = filter(&results, ".", false).unwrap();
        assert_eq!(view.as_slice(), &["carol.smith"]);
    }

    #[test]
    fn test_regex_filter() {
        let results = results();
        let view = filter(&results, r"^[a-c]", true).unwrap();
        assert_eq!(view.as_slice(), &["Alice_B", "bob", "carol.smith"]);

        let view = filter(&results, r"\d+$", true).unwrap();
        assert_eq!(view.as_slice(), &["dave99"]);

        let view = filter(&results, "_B$", true).unwrap();
        assert_eq!(view.as_slice(), &["Alice_B"]);
    }

    #[test]
    fn test_invalid_regex() {
        let results = results();
        match filter(&results, "(unbalanced", true) {
            Err(FollowDiffError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(unbalanced"),
            other => panic!("expected invalid pattern, got {:?}", other),
        }
        // The same text is fine as a literal.
        assert!(filter(&results, "(unbalanced", false).unwrap().is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let results = results();
        for (query, use_regex) in [("al", false), ("o", false), ("^.{3}$", true), ("i", true)] {
            let once = filter(&results, query, use_regex).unwrap();
            let twice = filter(once.as_slice(), query, use_regex).unwrap();
            assert_eq!(once, twice, "query {:?}", query);
        }
    }

    #[test]
    fn test_matcher_kinds() {
        assert!(Matcher::new("", true).unwrap().is_all());
        assert!(matches!(Matcher::new("Ab", false).unwrap(), Matcher::Literal(ref s) if s == "ab"));
        assert!(Matcher::new("a+", true).unwrap().matches("AAA"));
    }
}
