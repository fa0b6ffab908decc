use std::collections::HashSet;

/// A single account handle. Comparisons are case-sensitive.
pub type Identifier = String;

/// The set of account handles read from one export file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSet {
    accounts: HashSet<Identifier>,
}

/// Handles that are always excluded from comparison results.
pub type Whitelist = AccountSet;

impl AccountSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<Identifier>>(&mut self, identifier: S) -> bool {
        self.accounts.insert(identifier.into())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.accounts.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.accounts.iter().map(String::as_str)
    }

    /// Identifiers in `self` that are in neither `other` nor `excluded`.
    pub fn difference<'a>(
        &'a self,
        other: &'a AccountSet,
        excluded: &'a AccountSet,
    ) -> impl Iterator<Item = &'a str> {
        self.iter()
            .filter(move |id| !other.contains(id) && !excluded.contains(id))
    }

    pub fn intersection_count(&self, other: &AccountSet) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().filter(|id| large.contains(id)).count()
    }

    /// All identifiers in ascending code-point order.
    pub fn sorted(&self) -> Vec<Identifier> {
        let mut sorted: Vec<Identifier> = self.accounts.iter().cloned().collect();
        sorted.sort_unstable();
        sorted
    }
}

impl<S: Into<Identifier>> FromIterator<S> for AccountSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            accounts: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<Identifier>> Extend<S> for AccountSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.accounts.extend(iter.into_iter().map(Into::into));
    }
}
