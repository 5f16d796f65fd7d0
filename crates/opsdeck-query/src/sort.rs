//! Sorting: direction, sort specs and the nulls-last comparator.
//!
//! Sort keys are extracted once per record into an owned [`SortValue`], which
//! has a total order. Comparing owned keys keeps the comparator consistent
//! even when a column mixes types, and lets the record's input position act
//! as the final tie-break.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::value::{Number, Timestamp, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An owned, totally ordered sort key.
///
/// Values of different kinds order by kind: booleans, then numbers, then
/// timestamps, then text. Date strings in any form [`Timestamp::parse`]
/// accepts are read as timestamps, so ISO dates with different offsets or
/// precisions still sort chronologically. Missing values, nested objects and
/// NaN become [`SortValue::Missing`].
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Boolean key (`false < true`).
    Bool(bool),
    /// Numeric key.
    Number(Number),
    /// Timestamp key, compared by epoch milliseconds.
    Timestamp(Timestamp),
    /// Text key, compared lexically.
    Text(String),
    /// No usable key.
    Missing,
}

impl SortValue {
    /// Extracts a sort key from a field value.
    pub fn from_value(value: &Value<'_>) -> SortValue {
        match value {
            Value::Bool(b) => SortValue::Bool(*b),
            Value::Number(n) if n.is_nan() => SortValue::Missing,
            Value::Number(n) => SortValue::Number(*n),
            Value::Timestamp(t) => SortValue::Timestamp(*t),
            Value::String(s) => match Timestamp::parse(s) {
                Some(t) => SortValue::Timestamp(t),
                None => SortValue::Text((*s).to_string()),
            },
            Value::List(items) => SortValue::Text(items.join(", ")),
            Value::Object | Value::None => SortValue::Missing,
        }
    }

    /// Returns `true` if there is no usable key.
    pub fn is_missing(&self) -> bool {
        matches!(self, SortValue::Missing)
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Number(_) => 1,
            SortValue::Timestamp(_) => 2,
            SortValue::Text(_) => 3,
            SortValue::Missing => 4,
        }
    }

    /// Ascending comparison of two present keys.
    fn cmp_present(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.compare(*b).unwrap_or(Ordering::Equal),
            (SortValue::Timestamp(a), SortValue::Timestamp(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Compares two keys in the given direction, keeping missing keys last
    /// whatever the direction.
    pub fn compare(&self, other: &SortValue, dir: Dir) -> Ordering {
        match (self.is_missing(), other.is_missing()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => dir.apply(self.cmp_present(other)),
        }
    }
}

/// Compares two field values ascending, with missing values last.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    SortValue::from_value(a).compare(&SortValue::from_value(b), Dir::Asc)
}

/// A declarative sort: a key field, a direction and an optional tie-break
/// field (always ascending).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    pub dir: Dir,
    /// Secondary key for records with equal primary keys.
    pub tie_break: Option<String>,
}

impl Sort {
    /// Creates a sort with the given direction.
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        Sort {
            field: field.into(),
            dir,
            tie_break: None,
        }
    }

    /// Creates an ascending sort.
    pub fn asc(field: impl Into<String>) -> Self {
        Sort::new(field, Dir::Asc)
    }

    /// Creates a descending sort.
    pub fn desc(field: impl Into<String>) -> Self {
        Sort::new(field, Dir::Desc)
    }

    /// Sets the tie-break field.
    pub fn then_by(mut self, field: impl Into<String>) -> Self {
        self.tie_break = Some(field.into());
        self
    }

    /// Sorts `records` in place.
    pub fn apply<T, F>(&self, records: &mut Vec<&T>, accessor: F)
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a>,
    {
        let tie_break = self.tie_break.as_deref();
        sort_keyed(
            records,
            self.dir,
            |item| SortValue::from_value(&accessor(item, &self.field)),
            |item| tie_break.map_or(SortValue::Missing, |field| SortValue::from_value(&accessor(item, field))),
        );
    }
}

/// Sorts `records` by a key function.
///
/// Records with equal keys keep their input order. Missing keys go last in
/// either direction.
///
/// ```
/// use opsdeck_query::{sort_by_key_fn, Dir, Number, Value};
///
/// let scores = vec![3i64, 1, 2];
/// let mut refs: Vec<&i64> = scores.iter().collect();
/// sort_by_key_fn(&mut refs, Dir::Desc, |n: &i64| Value::Number(Number::I64(*n)));
/// assert_eq!(refs, vec![&3, &2, &1]);
/// ```
pub fn sort_by_key_fn<T, K>(records: &mut Vec<&T>, dir: Dir, key: K)
where
    K: for<'a> Fn(&'a T) -> Value<'a>,
{
    sort_keyed(
        records,
        dir,
        |item| SortValue::from_value(&key(item)),
        |_| SortValue::Missing,
    );
}

/// Sorts `records` by a key function, breaking ties with a second key
/// (ascending) and then by input order.
pub fn sort_by_key_fns<T, K, B>(records: &mut Vec<&T>, dir: Dir, key: K, tie_break: B)
where
    K: for<'a> Fn(&'a T) -> Value<'a>,
    B: for<'a> Fn(&'a T) -> Value<'a>,
{
    sort_keyed(
        records,
        dir,
        |item| SortValue::from_value(&key(item)),
        |item| SortValue::from_value(&tie_break(item)),
    );
}

fn sort_keyed<'r, T, K, B>(records: &mut Vec<&'r T>, dir: Dir, key: K, tie_break: B)
where
    K: Fn(&T) -> SortValue,
    B: Fn(&T) -> SortValue,
{
    let mut keyed: Vec<(usize, SortValue, SortValue, &'r T)> = records
        .iter()
        .enumerate()
        .map(|(index, &item)| (index, key(item), tie_break(item), item))
        .collect();

    keyed.sort_by(|a, b| {
        a.1.compare(&b.1, dir)
            .then_with(|| a.2.compare(&b.2, Dir::Asc))
            .then_with(|| a.0.cmp(&b.0))
    });

    *records = keyed.into_iter().map(|(_, _, _, item)| item).collect();
}
