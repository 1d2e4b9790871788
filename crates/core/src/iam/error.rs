use thiserror::Error;

use crate::arn::ArnError;

/// Errors that can occur while building a permission set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error(transparent)]
    Arn(#[from] ArnError),
    #[error("Export path prefix must not be empty")]
    EmptyExportPrefix,
    #[error("Export path prefix '{0}' must not contain wildcards")]
    WildcardExportPrefix(String),
    #[error("Statement '{0}' has no actions")]
    NoActions(String),
    #[error("Statement '{0}' has no resources")]
    NoResources(String),
    #[error("Role name '{0}' is invalid")]
    InvalidRoleName(String),
}

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
