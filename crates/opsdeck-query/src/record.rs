//! Record access: the [`Record`] trait, field conversions and dynamic records.
//!
//! The pipeline reads records only through accessor functions of the shape
//! `for<'a> Fn(&'a T, &str) -> Value<'a>`. Typed structs get one by
//! implementing [`Record`] (usually with `#[derive(Record)]`), and data that
//! arrives as loose JSON can be wrapped in a [`DynRecord`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::error::{QueryError, Result};
use crate::value::{Number, Timestamp, Value};

/// Trait for types that can be queried.
///
/// This trait is typically derived using `#[derive(Record)]` (enable the
/// `derive` feature), but can also be implemented manually.
///
/// # Derive Usage
///
/// ```ignore
/// use opsdeck_query::{Query, Record};
///
/// #[derive(Record)]
/// #[record(rename_all = "camelCase")]
/// struct Campaign {
///     #[record]
///     name: String,
///     #[record]
///     open_rate: f64,
///     internal_note: String,
/// }
///
/// let query = Query::new().greater_than(Campaign::OPEN_RATE, 0.25).build();
/// let results = query.filter(&campaigns, Campaign::accessor);
/// ```
///
/// # Manual Implementation
///
/// ```
/// use opsdeck_query::{Record, Value, Number};
///
/// struct Subscriber {
///     email: String,
///     opens: u32,
/// }
///
/// impl Record for Subscriber {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "email" => Value::String(&self.email),
///             "opens" => Value::Number(Number::from(self.opens)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value of a field, or [`Value::None`] if the record has no
    /// such field or the field is null.
    fn field_value(&self, field: &str) -> Value<'_>;

    /// Returns a static accessor function suitable for [`Query::filter`](crate::Query::filter).
    ///
    /// ```ignore
    /// let results = query.filter(&campaigns, Campaign::accessor);
    /// ```
    fn accessor<'a>(item: &'a Self, field: &str) -> Value<'a>
    where
        Self: Sized,
    {
        item.field_value(field)
    }
}

/// Conversion of a field into a borrowed [`Value`].
///
/// Implemented for the field types the derive macro supports. `Option<T>`
/// maps `None` to [`Value::None`], which is what makes a draft campaign's
/// absent `scheduledAt` sort last and fail date predicates quietly.
pub trait ToValue {
    /// Borrows this field as a query value.
    fn to_value(&self) -> Value<'_>;
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl ToValue for Number {
    fn to_value(&self) -> Value<'_> {
        Value::Number(*self)
    }
}

impl ToValue for Timestamp {
    fn to_value(&self) -> Value<'_> {
        Value::Timestamp(*self)
    }
}

impl<Tz: TimeZone> ToValue for DateTime<Tz> {
    fn to_value(&self) -> Value<'_> {
        Value::Timestamp(Timestamp(self.timestamp_millis()))
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value<'_> {
        Value::Timestamp(Timestamp::from(*self))
    }
}

impl ToValue for Vec<String> {
    fn to_value(&self) -> Value<'_> {
        Value::List(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::None,
        }
    }
}

macro_rules! number_to_value {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }
            }
        )*
    };
}

number_to_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Owned field value stored in a [`DynRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit null.
    Null,
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// Array of strings.
    List(Vec<String>),
    /// Nested object, addressed with dotted paths.
    Object(DynRecord),
}

impl FieldValue {
    /// Borrows this field as a query value.
    ///
    /// Nested objects read as [`Value::Object`]: they exist, but no
    /// comparison matches them.
    pub fn as_value(&self) -> Value<'_> {
        match self {
            FieldValue::Null => Value::None,
            FieldValue::Object(_) => Value::Object,
            FieldValue::String(s) => Value::String(s),
            FieldValue::Number(n) => Value::Number(*n),
            FieldValue::Timestamp(t) => Value::Timestamp(*t),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::List(items) => Value::List(items),
        }
    }

    /// Converts a JSON value.
    ///
    /// Arrays become string lists: string elements are kept, numbers and
    /// booleans are rendered with `to_string`, and nulls, nested arrays and
    /// objects are dropped.
    pub fn from_json(value: serde_json::Value) -> FieldValue {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => FieldValue::Number(json_number(&n)),
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Array(items) => FieldValue::List(json_string_list(items)),
            serde_json::Value::Object(map) => FieldValue::Object(DynRecord::from_json_map(map)),
        }
    }
}

pub(crate) fn json_number(n: &serde_json::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::I64(i)
    } else if let Some(u) = n.as_u64() {
        Number::U64(u)
    } else {
        Number::F64(n.as_f64().unwrap_or(f64::NAN))
    }
}

pub(crate) fn json_string_list(items: Vec<serde_json::Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(t: Timestamp) -> Self {
        FieldValue::Timestamp(t)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(items: Vec<&str>) -> Self {
        FieldValue::List(items.into_iter().map(String::from).collect())
    }
}

impl From<DynRecord> for FieldValue {
    fn from(record: DynRecord) -> Self {
        FieldValue::Object(record)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

macro_rules! number_to_field {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(n: $ty) -> Self {
                    FieldValue::Number(Number::from(n))
                }
            }
        )*
    };
}

number_to_field!(i32, i64, u32, u64, usize, f64);

/// A record whose shape is only known at runtime.
///
/// Fields map names to [`FieldValue`]s. Nested objects are reachable with
/// dotted paths such as `"owner.name"`.
///
/// ```
/// use opsdeck_query::{DynRecord, Record, Value};
///
/// let record = DynRecord::from_json_str(
///     r#"{"name": "Spring Sale", "owner": {"name": "Dana"}, "tags": ["promo"]}"#,
/// ).unwrap();
///
/// assert_eq!(record.field_value("name"), Value::String("Spring Sale"));
/// assert_eq!(record.field_value("owner.name"), Value::String("Dana"));
/// assert_eq!(record.field_value("owner.email"), Value::None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl DynRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        DynRecord::default()
    }

    /// Adds a field, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Looks up a field by dotted path.
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            match current {
                FieldValue::Object(inner) => current = inner.fields.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Returns the number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over top-level fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Builds a record from a JSON value, which must be an object.
    pub fn from_json(value: serde_json::Value) -> Result<DynRecord> {
        match value {
            serde_json::Value::Object(map) => Ok(DynRecord::from_json_map(map)),
            other => Err(QueryError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parses a single JSON object.
    pub fn from_json_str(json: &str) -> Result<DynRecord> {
        DynRecord::from_json(serde_json::from_str(json)?)
    }

    /// Parses a JSON array of objects, as returned by list endpoints.
    pub fn many_from_json_str(json: &str) -> Result<Vec<DynRecord>> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value {
            serde_json::Value::Array(items) => items.into_iter().map(DynRecord::from_json).collect(),
            other => Err(QueryError::InvalidRecord(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            ))),
        }
    }

    fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> DynRecord {
        DynRecord {
            fields: map
                .into_iter()
                .map(|(k, v)| (k, FieldValue::from_json(v)))
                .collect(),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl Record for DynRecord {
    fn field_value(&self, field: &str) -> Value<'_> {
        self.get(field).map_or(Value::None, FieldValue::as_value)
    }
}
