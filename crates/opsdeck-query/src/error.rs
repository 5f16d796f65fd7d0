//! Error types for the query crate.

use thiserror::Error;

use crate::op::Op;

/// Errors that can occur when building or executing queries.
///
/// Only the build-time variants ever reach a caller of the pipeline.
/// `InvalidComparison` and `ClassifierFailure` describe a single record and
/// are logged and absorbed by [`Query`](crate::Query) so that one bad row
/// cannot empty a whole list.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A predicate could not be evaluated against a field value.
    #[error("cannot evaluate '{op}' on field '{field}': {reason}")]
    InvalidComparison {
        field: String,
        op: Op,
        reason: String,
    },

    /// A grouping classifier failed for a record.
    #[error("classifier failed: {reason}")]
    ClassifierFailure { reason: String },

    /// A declarative query spec is malformed.
    #[error("invalid query spec: {0}")]
    InvalidSpec(String),

    /// A dynamic record could not be built from its source data.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl QueryError {
    /// Builds a [`QueryError::ClassifierFailure`] from a reason.
    pub fn classifier(reason: impl Into<String>) -> Self {
        QueryError::ClassifierFailure {
            reason: reason.into(),
        }
    }

    /// Builds a [`QueryError::InvalidSpec`] from a message.
    pub fn spec(message: impl Into<String>) -> Self {
        QueryError::InvalidSpec(message.into())
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_comparison_message() {
        let err = QueryError::InvalidComparison {
            field: "scheduledAt".to_string(),
            op: Op::Before,
            reason: "field value 'soon' is not a date".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot evaluate 'before' on field 'scheduledAt': field value 'soon' is not a date"
        );
    }

    #[test]
    fn regex_error_converts() {
        let err: QueryError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, QueryError::InvalidRegex(_)));
    }
}
