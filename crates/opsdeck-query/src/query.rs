//! Query builder and executor.
//!
//! The [`Query`] struct provides a fluent builder API for constructing queries
//! and methods for executing them against record slices. Execution runs the
//! stages in a fixed order:
//!
//! ```text
//! filter -> sort -> group (optional) -> offset/limit
//! ```
//!
//! With grouping, offset and limit apply to each group, so "five most recent"
//! means five per section.

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::filter::{Filter, MatchMode};
use crate::group::{group_by, GroupBy, Groups};
use crate::op::Op;
use crate::page::{paginate, window, Page};
use crate::predicate::{Operand, Predicate};
use crate::search::Search;
use crate::sort::{Dir, Sort};
use crate::value::Value;

/// A query: filter, optional sort, optional offset and limit.
///
/// # Example
///
/// ```
/// use opsdeck_query::{Query, Dir, Value, Number};
///
/// struct Campaign {
///     name: String,
///     status: String,
///     opens: u32,
/// }
///
/// fn accessor<'a>(c: &'a Campaign, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::String(&c.name),
///         "status" => Value::String(&c.status),
///         "opens" => Value::Number(Number::from(c.opens)),
///         _ => Value::None,
///     }
/// }
///
/// let campaigns = vec![
///     Campaign { name: "Spring Sale".into(), status: "sent".into(), opens: 410 },
///     Campaign { name: "Spring Webinar".into(), status: "sent".into(), opens: 980 },
///     Campaign { name: "Winter Sale".into(), status: "draft".into(), opens: 0 },
/// ];
///
/// let query = Query::new()
///     .search("spring", ["name"])
///     .equals("status", "sent")
///     .sort_desc("opens")
///     .limit(1)
///     .build();
///
/// let results = query.filter(&campaigns, accessor);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].name, "Spring Webinar");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    filter: Filter,
    sort: Option<(String, Dir)>,
    tie_break: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

/// Result of [`Query::execute`].
#[derive(Debug, PartialEq)]
pub enum QueryResult<'a, T> {
    /// Ordered records, when no grouping was requested.
    Flat(Vec<&'a T>),
    /// Ordered buckets of ordered records.
    Grouped(Groups<'a, T>),
}

impl<'a, T> QueryResult<'a, T> {
    /// Returns `true` if this is a grouped result.
    pub fn is_grouped(&self) -> bool {
        matches!(self, QueryResult::Grouped(_))
    }

    /// Number of records in the result, across all groups.
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Flat(items) => items.len(),
            QueryResult::Grouped(groups) => groups.total(),
        }
    }

    /// Returns `true` if the result holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the flat records, if ungrouped.
    pub fn as_flat(&self) -> Option<&[&'a T]> {
        match self {
            QueryResult::Flat(items) => Some(items),
            QueryResult::Grouped(_) => None,
        }
    }

    /// Returns the groups, if grouped.
    pub fn as_groups(&self) -> Option<&Groups<'a, T>> {
        match self {
            QueryResult::Grouped(groups) => Some(groups),
            QueryResult::Flat(_) => None,
        }
    }

    /// Consumes the result, returning the flat records if ungrouped.
    pub fn into_flat(self) -> Option<Vec<&'a T>> {
        match self {
            QueryResult::Flat(items) => Some(items),
            QueryResult::Grouped(_) => None,
        }
    }

    /// Consumes the result, returning the groups if grouped.
    pub fn into_groups(self) -> Option<Groups<'a, T>> {
        match self {
            QueryResult::Grouped(groups) => Some(groups),
            QueryResult::Flat(_) => None,
        }
    }
}

impl Query {
    /// Creates a new empty query.
    ///
    /// An empty query matches all records and keeps their order.
    pub fn new() -> Self {
        Query::default()
    }

    // ========================================================================
    // Filter builders
    // ========================================================================

    /// Sets the free-text search over `fields`.
    pub fn search<I, S>(mut self, text: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter.set_search(Search::new(text, fields));
        self
    }

    /// Adds a predicate.
    pub fn predicate(mut self, field: &str, op: Op, value: impl Into<Operand>) -> Self {
        self.filter.push(Predicate::new(field, op, value));
        self
    }

    /// Adds a prebuilt predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.filter.push(predicate);
        self
    }

    /// Requires only one predicate to match instead of all of them.
    ///
    /// The text search still applies on top.
    pub fn match_any(mut self) -> Self {
        self.filter.set_mode(MatchMode::Any);
        self
    }

    /// Sets how predicates combine.
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.filter.set_mode(mode);
        self
    }

    /// Adds an equality predicate.
    pub fn equals(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::Equals, value)
    }

    /// Adds a not-equal predicate.
    pub fn not_equals(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::NotEquals, value)
    }

    /// Adds a contains predicate (substring, or list membership).
    pub fn contains(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::Contains, value)
    }

    /// Adds a does-not-contain predicate.
    pub fn does_not_contain(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::DoesNotContain, value)
    }

    /// Adds a starts-with predicate.
    pub fn starts_with(self, field: &str, value: &str) -> Self {
        self.predicate(field, Op::StartsWith, value)
    }

    /// Adds an ends-with predicate.
    pub fn ends_with(self, field: &str, value: &str) -> Self {
        self.predicate(field, Op::EndsWith, value)
    }

    /// Adds a regex predicate.
    ///
    /// Returns an error if the pattern is invalid.
    pub fn regex(self, field: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        Ok(self.predicate(field, Op::Matches, regex))
    }

    /// Adds a greater-than predicate.
    pub fn greater_than(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::GreaterThan, value)
    }

    /// Adds a greater-than-or-equal predicate.
    pub fn greater_or_equal(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::GreaterOrEqual, value)
    }

    /// Adds a less-than predicate.
    pub fn less_than(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::LessThan, value)
    }

    /// Adds a less-than-or-equal predicate.
    pub fn less_or_equal(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::LessOrEqual, value)
    }

    /// Adds a before predicate. Both sides are read as dates.
    pub fn before(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::Before, value)
    }

    /// Adds an after predicate. Both sides are read as dates.
    pub fn after(self, field: &str, value: impl Into<Operand>) -> Self {
        self.predicate(field, Op::After, value)
    }

    /// Adds a one-of predicate.
    pub fn is_in<I, S>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: Vec<String> = values.into_iter().map(Into::into).collect();
        self.predicate(field, Op::In, set)
    }

    /// Adds a presence predicate.
    pub fn exists(self, field: &str) -> Self {
        self.predicate(field, Op::Exists, ())
    }

    /// Adds an absence predicate.
    pub fn does_not_exist(self, field: &str) -> Self {
        self.predicate(field, Op::DoesNotExist, ())
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Sets the sort key and direction.
    pub fn sort_by(mut self, field: &str, dir: Dir) -> Self {
        self.sort = Some((field.to_string(), dir));
        self
    }

    /// Sorts ascending by `field`.
    pub fn sort_asc(self, field: &str) -> Self {
        self.sort_by(field, Dir::Asc)
    }

    /// Sorts descending by `field`.
    pub fn sort_desc(self, field: &str) -> Self {
        self.sort_by(field, Dir::Desc)
    }

    /// Breaks sort ties by `field`, ascending.
    pub fn tie_break(mut self, field: &str) -> Self {
        self.tie_break = Some(field.to_string());
        self
    }

    // ========================================================================
    // Limits
    // ========================================================================

    /// Sets the maximum number of results to return (per group when grouped).
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the number of results to skip (per group when grouped).
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Finalizes the query.
    pub fn build(self) -> Self {
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the filter stage.
    pub fn get_filter(&self) -> &Filter {
        &self.filter
    }

    /// Returns the sort stage, if any.
    pub fn get_sort(&self) -> Option<Sort> {
        self.sort.as_ref().map(|(field, dir)| Sort {
            field: field.clone(),
            dir: *dir,
            tie_break: self.tie_break.clone(),
        })
    }

    /// Returns the limit, if set.
    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the offset, if set.
    pub fn get_offset(&self) -> Option<usize> {
        self.offset
    }

    /// Returns `true` if this query keeps every record in input order.
    pub fn is_empty(&self) -> bool {
        self.filter.is_identity()
            && self.sort.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests if a single record passes the filter stage.
    pub fn matches<T, F>(&self, item: &T, accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.filter.matches(item, accessor)
    }

    /// Runs the full pipeline.
    ///
    /// Returns [`QueryResult::Grouped`] when `grouping` is given and
    /// [`QueryResult::Flat`] otherwise.
    pub fn execute<'a, T, F>(
        &self,
        items: &'a [T],
        accessor: F,
        grouping: Option<&GroupBy<T>>,
    ) -> QueryResult<'a, T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        let results = self.filter_and_sort(items, &accessor);
        let offset = self.offset.unwrap_or(0);

        match grouping {
            None => QueryResult::Flat(window(results, offset, self.limit)),
            Some(grouping) => {
                let groups = group_by(results, grouping).slice_each(offset, self.limit);
                debug!(
                    groups = groups.len(),
                    kept = groups.total(),
                    "grouped query results"
                );
                QueryResult::Grouped(groups)
            }
        }
    }

    /// Filters, sorts and slices, returning references into `items`.
    pub fn filter<'a, T, F>(&self, items: &'a [T], accessor: F) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        let results = self.filter_and_sort(items, &accessor);
        window(results, self.offset.unwrap_or(0), self.limit)
    }

    /// Filters, sorts and groups, slicing each group.
    pub fn group<'a, T, F>(&self, items: &'a [T], accessor: F, grouping: &GroupBy<T>) -> Groups<'a, T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        let results = self.filter_and_sort(items, &accessor);
        group_by(results, grouping).slice_each(self.offset.unwrap_or(0), self.limit)
    }

    /// Filters and clones matching records.
    pub fn filter_cloned<T, F>(&self, items: &[T], accessor: F) -> Vec<T>
    where
        T: Clone,
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        self.filter(items, accessor).into_iter().cloned().collect()
    }

    /// Filters and sorts, then cuts one page out of the result.
    ///
    /// The query's own offset and limit are ignored; the page replaces them.
    pub fn page<'a, T, F>(
        &self,
        items: &'a [T],
        accessor: F,
        page_size: usize,
        page_index: usize,
    ) -> Page<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        let results = self.filter_and_sort(items, &accessor);
        paginate(&results, page_size, page_index)
    }

    /// Counts the records passing the filter stage.
    pub fn count<T, F>(&self, items: &[T], accessor: F) -> usize
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        items
            .iter()
            .filter(|item| self.filter.matches(*item, &accessor))
            .count()
    }

    /// Returns `true` if any record passes the filter stage.
    pub fn any<T, F>(&self, items: &[T], accessor: F) -> bool
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        items.iter().any(|item| self.filter.matches(item, &accessor))
    }

    /// Finds the first record, in input order, that passes the filter stage.
    pub fn find<'a, T, F>(&self, items: &'a [T], accessor: F) -> Option<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        items.iter().find(|item| self.filter.matches(*item, &accessor))
    }

    fn filter_and_sort<'a, T, F>(&self, items: &'a [T], accessor: &F) -> Vec<&'a T>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b>,
    {
        let mut results = self.filter.apply(items, accessor);
        debug!(input = items.len(), matched = results.len(), "filtered records");

        if let Some(sort) = self.get_sort() {
            sort.apply(&mut results, accessor);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::UNCLASSIFIED;
    use crate::value::{Number, Timestamp};

    #[derive(Debug, Clone, PartialEq)]
    struct Campaign {
        id: i64,
        name: String,
        status: String,
        updated_at: Option<Timestamp>,
        tags: Vec<String>,
    }

    fn accessor<'a>(c: &'a Campaign, field: &str) -> Value<'a> {
        match field {
            "id" => Value::Number(Number::I64(c.id)),
            "name" => Value::String(&c.name),
            "status" => Value::String(&c.status),
            "updatedAt" => c.updated_at.map_or(Value::None, Value::Timestamp),
            "tags" => Value::List(&c.tags),
            _ => Value::None,
        }
    }

    fn campaign(id: i64, name: &str, status: &str, updated: Option<&str>, tags: &[&str]) -> Campaign {
        Campaign {
            id,
            name: name.to_string(),
            status: status.to_string(),
            updated_at: updated.and_then(Timestamp::parse),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn campaigns() -> Vec<Campaign> {
        vec![
            campaign(1, "Spring Sale", "sent", Some("2026-03-01T10:00:00Z"), &["promo"]),
            campaign(2, "Newsletter #12", "sent", Some("2026-03-05T10:00:00Z"), &["newsletter"]),
            campaign(3, "Winter Clearance", "draft", None, &["promo"]),
            campaign(4, "Spring Webinar", "scheduled", Some("2026-03-05T10:00:00Z"), &["event"]),
            campaign(5, "Partner Update", "sent", Some("2026-03-03T10:00:00Z"), &[]),
        ]
    }

    fn ids(items: &[&Campaign]) -> Vec<i64> {
        items.iter().map(|c| c.id).collect()
    }

    #[test]
    fn empty_query_is_identity() {
        let items = campaigns();
        let query = Query::new();
        assert!(query.is_empty());
        assert_eq!(ids(&query.filter(&items, accessor)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sort_desc_with_tie_break_and_limit() {
        let items = campaigns();
        let query = Query::new()
            .sort_desc("updatedAt")
            .tie_break("id")
            .limit(3)
            .build();
        assert_eq!(ids(&query.filter(&items, accessor)), vec![2, 4, 5]);
    }

    #[test]
    fn missing_sort_keys_go_last() {
        let items = campaigns();
        let asc = Query::new().sort_asc("updatedAt").filter(&items, accessor);
        let desc = Query::new().sort_desc("updatedAt").filter(&items, accessor);
        assert_eq!(ids(&asc).last(), Some(&3));
        assert_eq!(ids(&desc).last(), Some(&3));
    }

    #[test]
    fn search_and_predicates() {
        let items = campaigns();
        let query = Query::new()
            .search("spring", ["name"])
            .not_equals("status", "draft")
            .contains("tags", "promo");
        assert_eq!(ids(&query.filter(&items, accessor)), vec![1]);
    }

    #[test]
    fn match_any_combines_predicates_with_or() {
        let items = campaigns();
        let query = Query::new()
            .equals("status", "draft")
            .equals("status", "scheduled")
            .match_any();
        assert_eq!(ids(&query.filter(&items, accessor)), vec![3, 4]);
    }

    #[test]
    fn is_in_matches_a_set() {
        let items = campaigns();
        let query = Query::new().is_in("status", ["draft", "scheduled"]);
        assert_eq!(query.count(&items, accessor), 2);
    }

    #[test]
    fn before_excludes_missing_and_bad_dates() {
        let items = campaigns();
        let query = Query::new().before("updatedAt", "2026-03-04");
        assert_eq!(ids(&query.filter(&items, accessor)), vec![1, 5]);

        let bad = Query::new().before("updatedAt", "sometime");
        assert!(bad.filter(&items, accessor).is_empty());
    }

    #[test]
    fn offset_then_limit() {
        let items = campaigns();
        let query = Query::new().sort_asc("id").offset(1).limit(2);
        assert_eq!(ids(&query.filter(&items, accessor)), vec![2, 3]);

        let past = Query::new().offset(10);
        assert!(past.filter(&items, accessor).is_empty());
    }

    #[test]
    fn regex_builder_rejects_bad_patterns() {
        assert!(Query::new().regex("name", "[unclosed").is_err());

        let items = campaigns();
        let query = Query::new().regex("name", r"#\d+$").unwrap();
        assert_eq!(ids(&query.filter(&items, accessor)), vec![2]);
    }

    #[test]
    fn execute_flat_and_grouped() {
        let items = campaigns();
        let query = Query::new().sort_desc("updatedAt").tie_break("id").limit(1);

        let flat = query.execute(&items, accessor, None);
        assert!(!flat.is_grouped());
        assert_eq!(ids(flat.as_flat().unwrap()), vec![2]);

        let by_status = GroupBy::field("status", accessor).order(["draft"]);
        let grouped = query.execute(&items, accessor, Some(&by_status));
        let groups = grouped.as_groups().unwrap();
        assert_eq!(groups.labels(), vec!["draft", "sent", "scheduled"]);
        assert_eq!(ids(groups.get("sent").unwrap()), vec![2]);
        assert_eq!(grouped.len(), 3);
        assert!(groups.get(UNCLASSIFIED).is_none());
    }

    #[test]
    fn group_keeps_sorted_order_inside_buckets() {
        let items = campaigns();
        let by_status = GroupBy::field("status", accessor);
        let groups = Query::new()
            .sort_asc("updatedAt")
            .group(&items, accessor, &by_status);
        assert_eq!(ids(groups.get("sent").unwrap()), vec![1, 5, 2]);
    }

    #[test]
    fn page_ignores_limit() {
        let items = campaigns();
        let page = Query::new().sort_asc("id").limit(1).page(&items, accessor, 2, 1);
        assert_eq!(ids(&page.items), vec![3, 4]);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn find_and_any() {
        let items = campaigns();
        let query = Query::new().equals("status", "sent");
        assert_eq!(query.find(&items, accessor).map(|c| c.id), Some(1));
        assert!(query.any(&items, accessor));
        assert!(!Query::new().equals("status", "archived").any(&items, accessor));
    }

    #[test]
    fn filter_cloned_returns_owned_records() {
        let items = campaigns();
        let owned = Query::new()
            .contains("tags", "promo")
            .sort_desc("id")
            .filter_cloned(&items, accessor);
        assert_eq!(owned, vec![items[2].clone(), items[0].clone()]);
    }

    #[test]
    fn introspection() {
        let query = Query::new().sort_desc("updatedAt").tie_break("id").limit(5);
        let sort = query.get_sort().unwrap();
        assert_eq!(sort.field, "updatedAt");
        assert_eq!(sort.dir, Dir::Desc);
        assert_eq!(sort.tie_break.as_deref(), Some("id"));
        assert_eq!(query.get_limit(), Some(5));
        assert_eq!(query.get_offset(), None);
    }
}
