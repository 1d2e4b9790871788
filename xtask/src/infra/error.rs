//! Error types for infrastructure tasks.

use thiserror::Error;
use todosearch_core::stack::StackError;

/// Result type alias for infra module.
pub type Result<T> = std::result::Result<T, InfraError>;

/// Errors that can occur during infrastructure tasks.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error("Table '{table_name}' not found")]
    TableNotFound { table_name: String },

    #[error("Failed to get user input: {0}")]
    Prompt(String),

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Timeout waiting for table to become active")]
    TableActivationTimeout,

    #[error("Policy audit found {0} problem(s)")]
    AuditFailed(usize),

    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
