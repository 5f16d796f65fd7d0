//! Group-by bucketing with caller-declared label order.
//!
//! A [`GroupBy`] wraps a classifier that maps a record to a label. Grouping
//! is exhaustive and disjoint: every record lands in exactly one bucket. A
//! record the classifier cannot label goes to [`UNCLASSIFIED`] instead of
//! failing the batch.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Days, FixedOffset, Offset, Utc};
use tracing::warn;

use crate::error::{QueryError, Result};
use crate::page::window;
use crate::value::{Timestamp, Value};

/// Label of the bucket for records whose classifier failed.
pub const UNCLASSIFIED: &str = "Unclassified";

type Classifier<T> = dyn Fn(&T) -> Result<String> + Send + Sync;

/// A classifier plus the priority order of its labels.
///
/// Labels listed in [`order`](GroupBy::order) come first, in that order.
/// Remaining labels follow in first-seen order, with [`UNCLASSIFIED`] last
/// unless it is listed explicitly.
///
/// ```
/// use opsdeck_query::{group_by, GroupBy};
///
/// let words: Vec<String> = ["apple", "avocado", "banana", "cherry", "blueberry"]
///     .iter()
///     .map(|w| w.to_string())
///     .collect();
/// let by_initial = GroupBy::new(|w: &String| Ok(w[..1].to_uppercase())).order(["B"]);
///
/// let groups = group_by(&words, &by_initial);
/// assert_eq!(groups.labels(), vec!["B", "A", "C"]);
/// assert_eq!(groups.total(), 5);
/// ```
pub struct GroupBy<T> {
    classifier: Box<Classifier<T>>,
    order: Vec<String>,
}

impl<T> GroupBy<T> {
    /// Creates a grouping from a classifier function.
    pub fn new<F>(classifier: F) -> Self
    where
        F: Fn(&T) -> Result<String> + Send + Sync + 'static,
    {
        GroupBy {
            classifier: Box::new(classifier),
            order: Vec::new(),
        }
    }

    /// Groups by the value of a field, rendered as text.
    ///
    /// Missing and blank values fail classification.
    pub fn field<F>(field: impl Into<String>, accessor: F) -> Self
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a> + Send + Sync + 'static,
    {
        let field = field.into();
        GroupBy::new(move |item: &T| {
            let label = accessor(item, &field).to_string();
            if label.trim().is_empty() {
                return Err(QueryError::classifier(format!("field '{field}' is empty")));
            }
            Ok(label)
        })
    }

    /// Groups by the date bucket of a date field.
    ///
    /// Buckets are listed as the priority order, newest first.
    pub fn date<F>(field: impl Into<String>, accessor: F, buckets: DateBuckets) -> Self
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a> + Send + Sync + 'static,
    {
        let field = field.into();
        GroupBy::new(move |item: &T| {
            let value = accessor(item, &field);
            let ts = value.coerce_timestamp().ok_or_else(|| {
                QueryError::classifier(format!(
                    "field '{field}' is not a date: {:?}",
                    value.to_string()
                ))
            })?;
            buckets
                .bucket(ts)
                .map(|b| b.label().to_string())
                .ok_or_else(|| QueryError::classifier(format!("{ts} is out of range")))
        })
        .order(DateBucket::ALL.iter().map(|b| b.label()))
    }

    /// Sets the label priority order. Duplicates are ignored.
    pub fn order<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order.clear();
        for label in labels {
            let label = label.into();
            if !self.order.contains(&label) {
                self.order.push(label);
            }
        }
        self
    }

    /// Returns the label priority order.
    pub fn priority(&self) -> &[String] {
        &self.order
    }

    /// Classifies one record. Failures are logged and yield [`UNCLASSIFIED`].
    pub fn classify(&self, item: &T) -> String {
        match (self.classifier)(item) {
            Ok(label) => label,
            Err(error) => {
                warn!(%error, bucket = UNCLASSIFIED, "classifier failed");
                UNCLASSIFIED.to_string()
            }
        }
    }

    /// Classifies one record, returning the classifier's error.
    pub fn try_classify(&self, item: &T) -> Result<String> {
        (self.classifier)(item)
    }
}

impl<T> fmt::Debug for GroupBy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupBy")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// One labelled bucket.
#[derive(Debug, PartialEq)]
pub struct Group<'a, T> {
    /// The bucket label.
    pub label: String,
    /// The records in the bucket, in input order.
    pub items: Vec<&'a T>,
}

impl<T> Clone for Group<'_, T> {
    fn clone(&self) -> Self {
        Group {
            label: self.label.clone(),
            items: self.items.clone(),
        }
    }
}

/// Ordered buckets produced by [`group_by`].
#[derive(Debug, PartialEq)]
pub struct Groups<'a, T> {
    groups: Vec<Group<'a, T>>,
}

impl<T> Clone for Groups<'_, T> {
    fn clone(&self) -> Self {
        Groups {
            groups: self.groups.clone(),
        }
    }
}

impl<'a, T> Groups<'a, T> {
    /// Iterates the buckets in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Group<'a, T>> {
        self.groups.iter()
    }

    /// Returns the records of a bucket.
    pub fn get(&self, label: &str) -> Option<&[&'a T]> {
        self.groups
            .iter()
            .find(|g| g.label == label)
            .map(|g| g.items.as_slice())
    }

    /// Returns the labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_str()).collect()
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no buckets.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of records across all buckets.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    /// Applies offset and limit to every bucket. Buckets left empty are kept.
    pub fn slice_each(self, offset: usize, limit: Option<usize>) -> Self {
        Groups {
            groups: self
                .groups
                .into_iter()
                .map(|g| Group {
                    label: g.label,
                    items: window(g.items, offset, limit),
                })
                .collect(),
        }
    }

    /// Consumes the buckets.
    pub fn into_vec(self) -> Vec<Group<'a, T>> {
        self.groups
    }
}

impl<'a, T> IntoIterator for Groups<'a, T> {
    type Item = Group<'a, T>;
    type IntoIter = std::vec::IntoIter<Group<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'g, 'a, T> IntoIterator for &'g Groups<'a, T> {
    type Item = &'g Group<'a, T>;
    type IntoIter = std::slice::Iter<'g, Group<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Partitions `items` into ordered buckets.
///
/// Records keep their relative input order inside each bucket.
pub fn group_by<'a, T, I>(items: I, grouping: &GroupBy<T>) -> Groups<'a, T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen: Vec<Group<'a, T>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let label = grouping.classify(item);
        match index.get(&label) {
            Some(&i) => seen[i].items.push(item),
            None => {
                index.insert(label.clone(), seen.len());
                seen.push(Group {
                    label,
                    items: vec![item],
                });
            }
        }
    }

    let mut slots: Vec<Option<Group<'a, T>>> = seen.into_iter().map(Some).collect();
    let mut groups = Vec::with_capacity(slots.len());

    for label in grouping.priority() {
        if let Some(group) = index.get(label).and_then(|&i| slots[i].take()) {
            groups.push(group);
        }
    }

    let mut unclassified = None;
    for group in slots.into_iter().flatten() {
        if group.label == UNCLASSIFIED {
            unclassified = Some(group);
        } else {
            groups.push(group);
        }
    }
    groups.extend(unclassified);

    Groups { groups }
}

/// Relative date buckets, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateBucket {
    /// On the reference day, or later.
    Today,
    /// The day before the reference day.
    Yesterday,
    /// Two to six days before the reference day.
    ThisWeek,
    /// Seven or more days before the reference day.
    Older,
}

impl DateBucket {
    /// All buckets in display order.
    pub const ALL: [DateBucket; 4] = [
        DateBucket::Today,
        DateBucket::Yesterday,
        DateBucket::ThisWeek,
        DateBucket::Older,
    ];

    /// Returns the bucket label.
    pub fn label(self) -> &'static str {
        match self {
            DateBucket::Today => "Today",
            DateBucket::Yesterday => "Yesterday",
            DateBucket::ThisWeek => "This Week",
            DateBucket::Older => "Older",
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Assigns timestamps to [`DateBucket`]s relative to a reference time.
///
/// Calendar days are taken in a fixed UTC offset, UTC by default.
#[derive(Debug, Clone, Copy)]
pub struct DateBuckets {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl DateBuckets {
    /// Buckets relative to `now`, with days in UTC.
    pub fn new(now: DateTime<Utc>) -> Self {
        DateBuckets {
            now,
            offset: Utc.fix(),
        }
    }

    /// Sets the UTC offset used to find day boundaries.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Returns the reference time.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Returns the bucket for `ts`, or `None` if it is outside chrono's range.
    pub fn bucket(&self, ts: Timestamp) -> Option<DateBucket> {
        let today = self.now.with_timezone(&self.offset).date_naive();
        let date = ts.to_datetime()?.with_timezone(&self.offset).date_naive();

        if date >= today {
            return Some(DateBucket::Today);
        }
        if today.pred_opt() == Some(date) {
            return Some(DateBucket::Yesterday);
        }
        match today.checked_sub_days(Days::new(7)) {
            Some(week_ago) if date > week_ago => Some(DateBucket::ThisWeek),
            _ => Some(DateBucket::Older),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, PartialEq)]
    struct Note {
        id: u32,
        kind: &'static str,
        at: &'static str,
    }

    fn accessor<'a>(note: &'a Note, field: &str) -> Value<'a> {
        match field {
            "kind" => Value::String(note.kind),
            "at" => Value::String(note.at),
            _ => Value::None,
        }
    }

    fn notes() -> Vec<Note> {
        vec![
            Note { id: 1, kind: "billing", at: "2026-03-10T08:00:00Z" },
            Note { id: 2, kind: "security", at: "2026-03-09T23:59:59Z" },
            Note { id: 3, kind: "", at: "not a date" },
            Note { id: 4, kind: "billing", at: "2026-03-04T12:00:00Z" },
            Note { id: 5, kind: "team", at: "2026-03-03T12:00:00Z" },
            Note { id: 6, kind: "security", at: "2026-03-10T00:00:00Z" },
        ]
    }

    fn ids(items: &[&Note]) -> Vec<u32> {
        items.iter().map(|n| n.id).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap()
    }

    #[test]
    fn labels_follow_priority_then_first_seen() {
        let notes = notes();
        let grouping = GroupBy::field("kind", accessor).order(["team", "missing"]);
        let groups = group_by(&notes, &grouping);

        assert_eq!(groups.labels(), vec!["team", "billing", "security", UNCLASSIFIED]);
        assert_eq!(ids(groups.get("billing").unwrap()), vec![1, 4]);
        assert_eq!(ids(groups.get(UNCLASSIFIED).unwrap()), vec![3]);
    }

    #[test]
    fn unclassified_can_be_prioritized() {
        let notes = notes();
        let grouping = GroupBy::field("kind", accessor).order([UNCLASSIFIED]);
        let groups = group_by(&notes, &grouping);
        assert_eq!(groups.labels()[0], UNCLASSIFIED);
    }

    #[test]
    fn grouping_is_exhaustive() {
        let notes = notes();
        let grouping = GroupBy::field("kind", accessor);
        assert_eq!(group_by(&notes, &grouping).total(), notes.len());
    }

    #[test]
    fn classifier_errors_are_isolated() {
        let notes = notes();
        let grouping: GroupBy<Note> = GroupBy::new(|n: &Note| {
            if n.id == 2 {
                Err(QueryError::classifier("boom"))
            } else {
                Ok("ok".to_string())
            }
        });
        let groups = group_by(&notes, &grouping);
        assert_eq!(groups.labels(), vec!["ok", UNCLASSIFIED]);
        assert_eq!(ids(groups.get(UNCLASSIFIED).unwrap()), vec![2]);
        assert!(grouping.try_classify(&notes[1]).is_err());
    }

    #[test]
    fn empty_input_has_no_groups() {
        let notes: Vec<Note> = Vec::new();
        let grouping = GroupBy::field("kind", accessor).order(["billing"]);
        assert!(group_by(&notes, &grouping).is_empty());
    }

    #[test]
    fn date_buckets_relative_to_now() {
        let buckets = DateBuckets::new(now());
        let at = |s: &str| buckets.bucket(Timestamp::parse(s).unwrap());

        assert_eq!(at("2026-03-10T00:00:00Z"), Some(DateBucket::Today));
        assert_eq!(at("2026-03-11T09:00:00Z"), Some(DateBucket::Today));
        assert_eq!(at("2026-03-09T23:59:59Z"), Some(DateBucket::Yesterday));
        assert_eq!(at("2026-03-08T00:00:00Z"), Some(DateBucket::ThisWeek));
        assert_eq!(at("2026-03-04T00:00:00Z"), Some(DateBucket::ThisWeek));
        assert_eq!(at("2026-03-03T23:00:00Z"), Some(DateBucket::Older));
    }

    #[test]
    fn date_buckets_respect_offset() {
        // 23:30 UTC on the 9th is already the 10th at UTC+02:00.
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let buckets = DateBuckets::new(now()).with_offset(offset);
        let ts = Timestamp::parse("2026-03-09T23:30:00Z").unwrap();
        assert_eq!(buckets.bucket(ts), Some(DateBucket::Today));
        assert_eq!(DateBuckets::new(now()).bucket(ts), Some(DateBucket::Yesterday));
    }

    #[test]
    fn group_by_date_orders_buckets() {
        let notes = notes();
        let grouping = GroupBy::date("at", accessor, DateBuckets::new(now()));
        let groups = group_by(&notes, &grouping);

        assert_eq!(
            groups.labels(),
            vec!["Today", "Yesterday", "This Week", "Older", UNCLASSIFIED]
        );
        assert_eq!(ids(groups.get("Today").unwrap()), vec![1, 6]);
        assert_eq!(ids(groups.get("This Week").unwrap()), vec![4]);
        assert_eq!(ids(groups.get("Older").unwrap()), vec![5]);
    }

    #[test]
    fn slice_each_limits_every_group() {
        let notes = notes();
        let grouping = GroupBy::field("kind", accessor);
        let groups = group_by(&notes, &grouping).slice_each(0, Some(1));

        assert_eq!(groups.total(), 4);
        for group in &groups {
            assert_eq!(group.items.len(), 1);
        }
    }
}
