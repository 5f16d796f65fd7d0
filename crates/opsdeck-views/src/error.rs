//! Error types for saved views.

use thiserror::Error;

use crate::records::DashboardPage;

/// Errors that can occur when loading or running saved views.
#[derive(Debug, Error)]
pub enum ViewError {
    /// No view with this name in the catalog.
    #[error("unknown view: {0}")]
    UnknownView(String),

    /// The view lists a different page than the records passed to it.
    #[error("view '{view}' lists {expected}, not {found}")]
    WrongPage {
        view: String,
        expected: DashboardPage,
        found: DashboardPage,
    },

    /// The view's query spec is invalid.
    #[error("view '{view}': {source}")]
    Query {
        view: String,
        #[source]
        source: opsdeck_query::QueryError,
    },

    /// The catalog file could not be read.
    #[error("failed to read view catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not valid YAML.
    #[error("invalid view catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;
