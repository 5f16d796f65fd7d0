//! Free-text search across a declared set of fields.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Case-insensitive text search over a list of fields.
///
/// A record matches when ANY of the fields contains the search term. String
/// fields match on substring; list fields match when any element contains
/// the term. Other value types never match.
///
/// A search with blank text or no fields matches everything.
///
/// ```
/// use opsdeck_query::{Search, Value};
///
/// fn accessor<'a>(name: &'a String, _field: &str) -> Value<'a> {
///     Value::String(name)
/// }
///
/// let search = Search::new("  spring ", ["name"]);
/// assert!(search.matches(&"Spring Sale".to_string(), accessor));
/// assert!(!search.matches(&"Winter Sale".to_string(), accessor));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Search {
    text: String,
    #[serde(default)]
    fields: Vec<String>,
}

impl Search {
    /// Creates a search for `text` over `fields`. The text is trimmed.
    pub fn new<I, S>(text: impl AsRef<str>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Search {
            text: text.as_ref().trim().to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The (trimmed) search text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The fields searched.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns `true` if this search filters nothing out.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() || self.fields.is_empty()
    }

    /// Tests a record against this search.
    pub fn matches<T, F>(&self, item: &T, accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        if self.is_empty() {
            return true;
        }
        let needle = self.text.trim().to_lowercase();
        self.fields
            .iter()
            .any(|field| value_contains(&accessor(item, field), &needle))
    }
}

/// `needle` must already be lowercase.
fn value_contains(value: &Value<'_>, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::List(items) => items.iter().any(|item| item.to_lowercase().contains(needle)),
        _ => false,
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub(crate) fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}

pub(crate) fn ends_with_ignore_case(haystack: &str, suffix: &str) -> bool {
    haystack.to_lowercase().ends_with(&suffix.to_lowercase())
}
