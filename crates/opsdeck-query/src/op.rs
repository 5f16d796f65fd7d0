//! Comparison operators for predicates.
//!
//! The [`Op`] enum lists every supported operator. Serialized names are
//! snake_case (`"not_equals"`, `"greater_than"`); shorthands such as
//! `"eq"`, `"gt"` and `"regex"` are accepted as aliases.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Comparison operator for a predicate.
///
/// Operators are grouped by what they inspect:
/// - **Equality**: `Equals`, `NotEquals`, `In`
/// - **Text/list**: `Contains`, `DoesNotContain`, `StartsWith`, `EndsWith`, `Matches`
/// - **Numeric**: `GreaterThan`, `GreaterOrEqual`, `LessThan`, `LessOrEqual`
/// - **Dates**: `Before`, `After`
/// - **Presence**: `Exists`, `DoesNotExist`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Equal (exact match).
    #[serde(alias = "eq")]
    Equals,
    /// Not equal.
    #[serde(alias = "ne")]
    NotEquals,
    /// Case-insensitive substring for strings, membership for lists.
    Contains,
    /// Negation of `Contains`.
    DoesNotContain,
    /// Case-insensitive prefix match.
    #[serde(alias = "startswith")]
    StartsWith,
    /// Case-insensitive suffix match.
    #[serde(alias = "endswith")]
    EndsWith,
    /// Regular expression match.
    #[serde(alias = "regex")]
    Matches,
    /// Greater than, with string-number coercion.
    #[serde(alias = "gt")]
    GreaterThan,
    /// Greater than or equal.
    #[serde(alias = "gte")]
    GreaterOrEqual,
    /// Less than, with string-number coercion.
    #[serde(alias = "lt")]
    LessThan,
    /// Less than or equal.
    #[serde(alias = "lte")]
    LessOrEqual,
    /// Earlier than; both sides are read as dates.
    Before,
    /// Later than; both sides are read as dates.
    After,
    /// Field value is one of the given strings.
    In,
    /// Field is present and not null.
    Exists,
    /// Field is missing or null.
    DoesNotExist,
}

impl Op {
    /// Every operator, in declaration order.
    pub const ALL: [Op; 16] = [
        Op::Equals,
        Op::NotEquals,
        Op::Contains,
        Op::DoesNotContain,
        Op::StartsWith,
        Op::EndsWith,
        Op::Matches,
        Op::GreaterThan,
        Op::GreaterOrEqual,
        Op::LessThan,
        Op::LessOrEqual,
        Op::Before,
        Op::After,
        Op::In,
        Op::Exists,
        Op::DoesNotExist,
    ];

    /// Returns `true` for operators defined as the negation of another.
    pub fn is_negated(self) -> bool {
        matches!(self, Op::NotEquals | Op::DoesNotContain | Op::DoesNotExist)
    }

    /// Returns the positive counterpart of a negated operator.
    ///
    /// - `NotEquals` -> `Equals`
    /// - `DoesNotContain` -> `Contains`
    /// - `DoesNotExist` -> `Exists`
    /// - Others unchanged
    pub fn positive(self) -> Op {
        match self {
            Op::NotEquals => Op::Equals,
            Op::DoesNotContain => Op::Contains,
            Op::DoesNotExist => Op::Exists,
            other => other,
        }
    }

    /// Returns `true` if the operator reads both sides as dates.
    pub fn is_date_op(self) -> bool {
        matches!(self, Op::Before | Op::After)
    }

    /// Returns `true` for the numeric ordering operators.
    pub fn is_ordering_op(self) -> bool {
        matches!(
            self,
            Op::GreaterThan | Op::GreaterOrEqual | Op::LessThan | Op::LessOrEqual
        )
    }

    /// Returns `true` if the operator ignores its operand.
    pub fn is_presence_op(self) -> bool {
        matches!(self, Op::Exists | Op::DoesNotExist)
    }

    /// Evaluates a comparison given an ordering result.
    ///
    /// Used for numeric and date comparisons, where the ordering is
    /// `field.cmp(operand)`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Equals => ordering == Ordering::Equal,
            Op::NotEquals => ordering != Ordering::Equal,
            Op::GreaterThan | Op::After => ordering == Ordering::Greater,
            Op::GreaterOrEqual => ordering != Ordering::Less,
            Op::LessThan | Op::Before => ordering == Ordering::Less,
            Op::LessOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the canonical name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Equals => "equals",
            Op::NotEquals => "not_equals",
            Op::Contains => "contains",
            Op::DoesNotContain => "does_not_contain",
            Op::StartsWith => "starts_with",
            Op::EndsWith => "ends_with",
            Op::Matches => "matches",
            Op::GreaterThan => "greater_than",
            Op::GreaterOrEqual => "greater_or_equal",
            Op::LessThan => "less_than",
            Op::LessOrEqual => "less_or_equal",
            Op::Before => "before",
            Op::After => "after",
            Op::In => "in",
            Op::Exists => "exists",
            Op::DoesNotExist => "does_not_exist",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Op {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim() {
            "eq" | "==" => Op::Equals,
            "ne" | "!=" => Op::NotEquals,
            "startswith" => Op::StartsWith,
            "endswith" => Op::EndsWith,
            "regex" => Op::Matches,
            "gt" | ">" => Op::GreaterThan,
            "gte" | ">=" => Op::GreaterOrEqual,
            "lt" | "<" => Op::LessThan,
            "lte" | "<=" => Op::LessOrEqual,
            other => Op::ALL
                .into_iter()
                .find(|op| op.as_str() == other)
                .ok_or_else(|| QueryError::spec(format!("unknown operator '{}'", other)))?,
        };
        Ok(op)
    }
}
