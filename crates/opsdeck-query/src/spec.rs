//! Declarative query specs.
//!
//! A [`QuerySpec`] is the serializable form of a [`Query`] plus an optional
//! grouping. Saved views are stored this way, in JSON or YAML:
//!
//! ```yaml
//! search: { text: spring, fields: [name, subject] }
//! filters:
//!   - { field: status, operator: in, value: [draft, scheduled] }
//! sort: { key: updatedAt, direction: desc, tie_break: id }
//! group_by: { kind: date, field: createdAt }
//! limit: 5
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::filter::MatchMode;
use crate::group::{DateBuckets, GroupBy};
use crate::op::Op;
use crate::predicate::{Operand, Predicate};
use crate::query::{Query, QueryResult};
use crate::sort::Dir;
use crate::value::Value;

/// Serializable description of a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuerySpec {
    /// Free-text search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchSpec>,
    /// Structured predicates.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<PredicateSpec>,
    /// How predicates combine.
    pub match_mode: MatchMode,
    /// Sort key, direction and tie-break.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    /// Optional grouping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<GroupBySpec>,
    /// Maximum records returned (per group when grouped).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Records skipped (per group when grouped).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Serializable text search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSpec {
    pub text: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Serializable predicate.
///
/// The operator is kept as text so that an unknown operator is reported as
/// [`QueryError::InvalidSpec`] with its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredicateSpec {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Serializable sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub direction: Dir,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break: Option<String>,
}

/// Kind of grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Label is the field's value.
    Field,
    /// Label is the field's date bucket relative to a reference time.
    Date,
}

/// Serializable grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupBySpec {
    pub kind: GroupKind,
    pub field: String,
    /// Label priority order. Date groupings default to newest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
    /// Offset from UTC, in minutes, used for date bucket day boundaries.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl QuerySpec {
    /// Parses a spec from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a spec from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Builds the query this spec describes. Grouping is not included.
    pub fn to_query(&self) -> Result<Query> {
        let mut query = Query::new().match_mode(self.match_mode);

        if let Some(search) = &self.search {
            query = query.search(&search.text, search.fields.iter().cloned());
        }
        for filter in &self.filters {
            query = query.with_predicate(filter.to_predicate()?);
        }
        if let Some(sort) = &self.sort {
            query = query.sort_by(&sort.key, sort.direction);
            if let Some(tie_break) = &sort.tie_break {
                query = query.tie_break(tie_break);
            }
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        Ok(query.build())
    }

    /// Builds the query and runs it, grouping when `group_by` is set.
    ///
    /// `now` is the reference time for date groupings and is required by
    /// them.
    pub fn run<'a, T, F>(
        &self,
        items: &'a [T],
        accessor: F,
        now: Option<DateTime<Utc>>,
    ) -> Result<QueryResult<'a, T>>
    where
        for<'b> F: Fn(&'b T, &str) -> Value<'b> + Clone + Send + Sync + 'static,
    {
        let query = self.to_query()?;
        let grouping = match &self.group_by {
            Some(spec) => Some(spec.build(accessor.clone(), now)?),
            None => None,
        };
        Ok(query.execute(items, accessor, grouping.as_ref()))
    }
}

impl TryFrom<&QuerySpec> for Query {
    type Error = QueryError;

    fn try_from(spec: &QuerySpec) -> Result<Query> {
        spec.to_query()
    }
}

impl TryFrom<QuerySpec> for Query {
    type Error = QueryError;

    fn try_from(spec: QuerySpec) -> Result<Query> {
        spec.to_query()
    }
}

impl PredicateSpec {
    /// Creates a predicate spec.
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: serde_json::Value) -> Self {
        PredicateSpec {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }

    /// Validates the operand shape and builds the predicate.
    pub fn to_predicate(&self) -> Result<Predicate> {
        let op: Op = self.operator.parse()?;

        if op.is_presence_op() {
            return Ok(Predicate::new(&self.field, op, Operand::None));
        }
        if op == Op::Matches {
            let pattern = self.value.as_str().ok_or_else(|| {
                QueryError::spec(format!("'{}' on '{}' needs a string pattern", op, self.field))
            })?;
            return Predicate::regex(&self.field, pattern);
        }

        let operand = match (op, Operand::from_json(self.value.clone())?) {
            (_, Operand::None) => {
                return Err(QueryError::spec(format!(
                    "'{}' on '{}' needs a value",
                    op, self.field
                )))
            }
            (Op::In, Operand::String(s)) => Operand::List(vec![s]),
            (Op::In, operand @ Operand::List(_)) => operand,
            (Op::In, _) => {
                return Err(QueryError::spec(format!(
                    "'in' on '{}' needs a list of strings",
                    self.field
                )))
            }
            (op, Operand::List(_) | Operand::Bool(_)) if op.is_date_op() || op.is_ordering_op() => {
                return Err(QueryError::spec(format!(
                    "'{}' on '{}' needs a number or a date",
                    op, self.field
                )))
            }
            (_, operand) => operand,
        };
        Ok(Predicate::new(&self.field, op, operand))
    }
}

impl GroupBySpec {
    /// Builds the grouping for records read through `accessor`.
    ///
    /// Date groupings need `now`; without it this returns
    /// [`QueryError::InvalidSpec`].
    pub fn build<T, F>(&self, accessor: F, now: Option<DateTime<Utc>>) -> Result<GroupBy<T>>
    where
        for<'a> F: Fn(&'a T, &str) -> Value<'a> + Send + Sync + 'static,
    {
        let grouping = match self.kind {
            GroupKind::Field => GroupBy::field(&self.field, accessor),
            GroupKind::Date => {
                let now = now.ok_or_else(|| {
                    QueryError::spec(format!(
                        "date grouping on '{}' needs a reference time",
                        self.field
                    ))
                })?;
                let offset = self
                    .utc_offset_minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        QueryError::spec(format!(
                            "UTC offset of {} minutes is out of range",
                            self.utc_offset_minutes
                        ))
                    })?;
                GroupBy::date(&self.field, accessor, DateBuckets::new(now).with_offset(offset))
            }
        };

        if self.order.is_empty() {
            Ok(grouping)
        } else {
            Ok(grouping.order(self.order.iter().cloned()))
        }
    }
}
