use crate::accounts::Identifier;
use crate::compare::Mode;
use crate::error::Result;
use crate::search::filter::{FilteredView, Matcher};
use tracing::debug;

/// The sorted results of the latest comparison, plus the currently
/// displayed subset of them.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    mode: Mode,
    entries: Vec<Identifier>,
    lowered: Vec<String>,
    view: Vec<usize>,
    query: String,
    use_regex: bool,
}

impl ResultStore {
    /// `entries` is expected to be sorted already.
    pub fn new(mode: Mode, entries: Vec<Identifier>) -> Self {
        let lowered = entries.iter().map(|id| id.to_lowercase()).collect();
        let view = (0..entries.len()).collect();
        Self {
            mode,
            entries,
            lowered,
            view,
            query: String::new(),
            use_regex: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn entries(&self) -> &[Identifier] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn uses_regex(&self) -> bool {
        self.use_regex
    }

    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::new(self.view.iter().map(|&i| self.entries[i].as_str()).collect())
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    /// Entry at `position` in the displayed view.
    pub fn visible(&self, position: usize) -> Option<&str> {
        self.view.get(position).map(|&i| self.entries[i].as_str())
    }

    /// Re-filter the displayed view. If the query does not compile, the
    /// error is returned and the current view is left exactly as it was.
    pub fn apply_filter(&mut self, query: &str, use_regex: bool) -> Result<usize> {
        let matcher = Matcher::new(query, use_regex)?;

        self.view = if matcher.is_all() {
            (0..self.entries.len()).collect()
        } else {
            self.lowered
                .iter()
                .enumerate()
                .filter(|(_, lowered)| matcher.matches_lowered(lowered))
                .map(|(i, _)| i)
                .collect()
        };
        self.query = query.to_string();
        self.use_regex = use_regex;

        debug!(action = "filter", component = "result_store", query = %query, use_regex, matched = self.view.len(), "Applied search filter");
        Ok(self.view.len())
    }

    pub fn clear_filter(&mut self) {
        self.view = (0..self.entries.len()).collect();
        self.query.clear();
    }
}
