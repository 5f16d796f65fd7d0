//! Filter composition: text search combined with structured predicates.

use serde::{Deserialize, Serialize};

use crate::predicate::Predicate;
use crate::search::Search;
use crate::value::Value;

/// How structured predicates combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every predicate must match.
    #[default]
    All,
    /// At least one predicate must match.
    Any,
}

impl MatchMode {
    /// Returns the display name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchMode::All => "all",
            MatchMode::Any => "any",
        }
    }
}

/// A search plus a list of predicates.
///
/// A record is included when:
///
/// ```text
/// (search is blank OR any search field contains the text)
///   AND (no predicates OR predicates pass under the match mode)
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filter {
    search: Search,
    predicates: Vec<Predicate>,
    mode: MatchMode,
}

impl Filter {
    /// Creates an identity filter.
    pub fn new() -> Self {
        Filter::default()
    }

    /// Sets the text search.
    pub fn with_search(mut self, search: Search) -> Self {
        self.search = search;
        self
    }

    /// Adds a predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Sets how predicates combine.
    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn set_search(&mut self, search: Search) {
        self.search = search;
    }

    pub(crate) fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub(crate) fn set_mode(&mut self, mode: MatchMode) {
        self.mode = mode;
    }

    /// Returns the text search.
    pub fn search(&self) -> &Search {
        &self.search
    }

    /// Returns the predicates.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns the match mode.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Returns `true` if this filter keeps every record.
    pub fn is_identity(&self) -> bool {
        self.search.is_empty() && self.predicates.is_empty()
    }

    /// Tests a single record.
    pub fn matches<T, F>(&self, item: &T, accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        if !self.search.matches(item, &accessor) {
            return false;
        }
        if self.predicates.is_empty() {
            return true;
        }
        let check = |predicate: &Predicate| predicate.matches(&accessor(item, &predicate.field));
        match self.mode {
            MatchMode::All => self.predicates.iter().all(check),
            MatchMode::Any => self.predicates.iter().any(check),
        }
    }

    /// Returns references to the matching records, in input order.
    pub fn apply<'a, T, F>(&self, items: &'a [T], accessor: F) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        if self.is_identity() {
            return items.iter().collect();
        }
        items
            .iter()
            .filter(|item| self.matches(*item, &accessor))
            .collect()
    }
}
