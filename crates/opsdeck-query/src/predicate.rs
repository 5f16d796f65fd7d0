//! Field-level predicates.
//!
//! A [`Predicate`] is a single `(field, operator, operand)` condition. It is
//! evaluated against the [`Value`] an accessor returns for that field.

use std::cmp::Ordering;

use regex::Regex;
use tracing::warn;

use crate::error::{QueryError, Result};
use crate::op::Op;
use crate::record::{json_number, json_string_list};
use crate::search::{contains_ignore_case, ends_with_ignore_case, starts_with_ignore_case};
use crate::value::{Number, Timestamp, Value};

/// A single filter predicate.
///
/// # Example
///
/// ```
/// use opsdeck_query::{Predicate, Op, Value};
///
/// let predicate = Predicate::new("subject", Op::Contains, "sale");
/// assert!(predicate.matches(&Value::String("Spring SALE is live")));
/// assert!(!predicate.matches(&Value::None));
/// ```
#[derive(Debug, Clone)]
pub struct Predicate {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub op: Op,
    /// The value to compare against.
    pub value: Operand,
}

impl Predicate {
    /// Creates a new predicate.
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<Operand>) -> Self {
        Predicate {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Creates a `matches` predicate, compiling the pattern.
    pub fn regex(field: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Predicate::new(field, Op::Matches, Regex::new(pattern)?))
    }

    /// Evaluates this predicate, reporting comparisons that cannot be made.
    ///
    /// Returns `Err(InvalidComparison)` when a `before`/`after` side is
    /// present but not a date, or when a `matches` predicate carries no
    /// compiled pattern. A missing field is never an error.
    pub fn try_matches(&self, field_value: &Value<'_>) -> Result<bool> {
        match self.op {
            Op::Exists => Ok(!field_value.is_none()),
            Op::DoesNotExist => Ok(field_value.is_none()),
            Op::NotEquals | Op::DoesNotContain => {
                Ok(!self.eval_positive(self.op.positive(), field_value)?)
            }
            op => self.eval_positive(op, field_value),
        }
    }

    /// Evaluates this predicate.
    ///
    /// Comparison failures are logged and count as a non-match, so a single
    /// malformed value excludes only its own record.
    pub fn matches(&self, field_value: &Value<'_>) -> bool {
        match self.try_matches(field_value) {
            Ok(matched) => matched,
            Err(err) => {
                warn!(field = %self.field, op = %self.op, error = %err, "predicate excluded record");
                false
            }
        }
    }

    fn eval_positive(&self, op: Op, field: &Value<'_>) -> Result<bool> {
        let matched = match op {
            Op::Equals => self.equals(field),
            Op::Contains => self.contains(field),
            Op::StartsWith => self.match_text(field, starts_with_ignore_case),
            Op::EndsWith => self.match_text(field, ends_with_ignore_case),
            Op::Matches => match (&self.value, field) {
                (Operand::Regex(regex), Value::String(s)) => regex.is_match(s),
                (Operand::Regex(_), _) => false,
                _ => return Err(self.invalid("operand is not a compiled pattern")),
            },
            Op::In => match (&self.value, field) {
                (Operand::List(set), Value::String(s)) => set.iter().any(|item| item == s),
                (Operand::String(single), Value::String(s)) => single == s,
                _ => false,
            },
            Op::GreaterThan | Op::GreaterOrEqual | Op::LessThan | Op::LessOrEqual => self
                .compare_ordered(field)
                .is_some_and(|ordering| op.eval_ordering(ordering)),
            Op::Before | Op::After => match self.compare_dates(field)? {
                Some(ordering) => op.eval_ordering(ordering),
                None => false,
            },
            Op::NotEquals | Op::DoesNotContain | Op::Exists | Op::DoesNotExist => {
                return self.try_matches(field)
            }
        };
        Ok(matched)
    }

    fn equals(&self, field: &Value<'_>) -> bool {
        match (&self.value, field) {
            (Operand::String(s), Value::String(f)) => f == s,
            (Operand::String(s), Value::Number(f)) => Number::parse(s)
                .and_then(|n| f.compare(n))
                .is_some_and(Ordering::is_eq),
            (Operand::String(s), Value::Timestamp(f)) => Timestamp::parse(s) == Some(*f),
            (Operand::String(s), Value::Bool(f)) => s.parse::<bool>().ok() == Some(*f),
            (Operand::Number(n), _) => field
                .coerce_number()
                .and_then(|f| f.compare(*n))
                .is_some_and(Ordering::is_eq),
            (Operand::Timestamp(t), _) => field.coerce_timestamp() == Some(*t),
            (Operand::Bool(b), Value::Bool(f)) => b == f,
            (Operand::List(items), Value::List(f)) => items.as_slice() == *f,
            _ => false,
        }
    }

    fn contains(&self, field: &Value<'_>) -> bool {
        match (&self.value, field) {
            (Operand::String(needle), Value::String(haystack)) => {
                contains_ignore_case(haystack, needle)
            }
            (Operand::String(needle), Value::List(items)) => items.iter().any(|i| i == needle),
            (Operand::List(needles), Value::List(items)) => {
                needles.iter().all(|needle| items.contains(needle))
            }
            _ => false,
        }
    }

    fn match_text(&self, field: &Value<'_>, test: fn(&str, &str) -> bool) -> bool {
        match (&self.value, field) {
            (Operand::String(pattern), Value::String(s)) => test(s, pattern),
            _ => false,
        }
    }

    /// `field.cmp(operand)` for numeric comparisons.
    ///
    /// Timestamps on either side compare as dates; everything else goes
    /// through numeric coercion, and non-numeric values do not compare.
    fn compare_ordered(&self, field: &Value<'_>) -> Option<Ordering> {
        match (&self.value, field) {
            (Operand::Timestamp(t), _) => field.coerce_timestamp().map(|f| f.cmp(t)),
            (_, Value::Timestamp(f)) => self.value.coerce_timestamp().map(|t| f.cmp(&t)),
            _ => {
                let f = field.coerce_number()?;
                let n = self.value.coerce_number()?;
                f.compare(n)
            }
        }
    }

    /// `field.cmp(operand)` with both sides read as dates.
    ///
    /// `Ok(None)` means the field is absent; `Err` means a side is present
    /// but unreadable as a date.
    fn compare_dates(&self, field: &Value<'_>) -> Result<Option<Ordering>> {
        if field.is_none() {
            return Ok(None);
        }
        let field_ts = field.coerce_timestamp().ok_or_else(|| {
            self.invalid(format!("field value '{}' is not a date", field))
        })?;
        let operand_ts = self
            .value
            .coerce_timestamp()
            .ok_or_else(|| self.invalid(format!("operand {} is not a date", self.value.describe())))?;
        Ok(Some(field_ts.cmp(&operand_ts)))
    }

    fn invalid(&self, reason: impl Into<String>) -> QueryError {
        QueryError::InvalidComparison {
            field: self.field.clone(),
            op: self.op,
            reason: reason.into(),
        }
    }
}

/// Evaluates one condition against a record.
///
/// ```
/// use opsdeck_query::{evaluate, Op, Value};
///
/// fn accessor<'a>(name: &'a String, _field: &str) -> Value<'a> {
///     Value::String(name)
/// }
///
/// let name = "Spring Sale".to_string();
/// assert!(evaluate(&name, accessor, "name", Op::Contains, "spring"));
/// assert!(!evaluate(&name, accessor, "name", Op::Before, "2026-01-01"));
/// ```
pub fn evaluate<T, F>(record: &T, accessor: F, field: &str, op: Op, value: impl Into<Operand>) -> bool
where
    for<'a> F: Fn(&'a T, &str) -> Value<'a>,
{
    Predicate::new(field, op, value).matches(&accessor(record, field))
}

/// Owned value stored in a predicate.
///
/// Unlike [`Value`], which borrows from the record, `Operand` owns its data
/// so it can live in query definitions.
#[derive(Debug, Clone)]
pub enum Operand {
    /// No operand (presence checks).
    None,
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// Set of strings (for `in`, or list equality/containment).
    List(Vec<String>),
    /// Compiled regular expression.
    Regex(Regex),
}

impl Operand {
    /// Reads the operand as a number, parsing string-encoded numbers.
    pub fn coerce_number(&self) -> Option<Number> {
        match self {
            Operand::Number(n) => Some(*n),
            Operand::String(s) => Number::parse(s),
            _ => None,
        }
    }

    /// Reads the operand as a point in time.
    pub fn coerce_timestamp(&self) -> Option<Timestamp> {
        match self {
            Operand::Timestamp(t) => Some(*t),
            Operand::Number(n) => Value::Number(*n).coerce_timestamp(),
            Operand::String(s) => Timestamp::parse(s),
            _ => None,
        }
    }

    /// Converts a JSON value from a declarative spec.
    pub fn from_json(value: serde_json::Value) -> Result<Operand> {
        Ok(match value {
            serde_json::Value::Null => Operand::None,
            serde_json::Value::Bool(b) => Operand::Bool(b),
            serde_json::Value::Number(n) => Operand::Number(json_number(&n)),
            serde_json::Value::String(s) => Operand::String(s),
            serde_json::Value::Array(items) => Operand::List(json_string_list(items)),
            serde_json::Value::Object(_) => {
                return Err(QueryError::spec("predicate values cannot be objects"))
            }
        })
    }

    fn describe(&self) -> String {
        match self {
            Operand::None => "none".to_string(),
            Operand::String(s) => format!("'{}'", s),
            Operand::Number(n) => n.to_string(),
            Operand::Timestamp(t) => t.to_string(),
            Operand::Bool(b) => b.to_string(),
            Operand::List(items) => format!("[{}]", items.join(", ")),
            Operand::Regex(r) => format!("/{}/", r.as_str()),
        }
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::String(s)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::String(s.to_string())
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<Timestamp> for Operand {
    fn from(t: Timestamp) -> Self {
        Operand::Timestamp(t)
    }
}

impl<Tz: chrono::TimeZone> From<chrono::DateTime<Tz>> for Operand {
    fn from(dt: chrono::DateTime<Tz>) -> Self {
        Operand::Timestamp(Timestamp::from(dt))
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

impl From<Regex> for Operand {
    fn from(r: Regex) -> Self {
        Operand::Regex(r)
    }
}

impl From<Vec<String>> for Operand {
    fn from(v: Vec<String>) -> Self {
        Operand::List(v)
    }
}

impl From<Vec<&str>> for Operand {
    fn from(v: Vec<&str>) -> Self {
        Operand::List(v.into_iter().map(String::from).collect())
    }
}

impl From<()> for Operand {
    fn from(_: ()) -> Self {
        Operand::None
    }
}

macro_rules! number_operand {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand {
                fn from(n: $ty) -> Self {
                    Operand::Number(Number::from(n))
                }
            }
        )*
    };
}

number_operand!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
