use thiserror::Error;

use crate::arn::ArnError;
use crate::iam::PolicyError;
use crate::pipeline::PipelineError;
use crate::schema::{SchemaError, TableError};

/// Configuration-time errors raised while composing a stack. Any of these
/// stops the deployment before an external resource is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Table error: {0}")]
    Table(#[from] TableError),
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("ARN error: {0}")]
    Arn(#[from] ArnError),
    #[error("Model {0} is not declared in the schema")]
    UnknownModel(String),
    #[error("Query {query} uses unknown data source {data_source}")]
    UnknownDataSource { query: String, data_source: String },
    #[error("Pipeline role policy has defects: {}", .0.join("; "))]
    PolicyDefects(Vec<String>),
    #[error("Pipeline role is missing permissions: {}", .0.join("; "))]
    MissingPermissions(Vec<String>),
    #[error("{context} assumes {actual}, expected the pipeline role {expected}")]
    RoleMismatch {
        context: String,
        expected: String,
        actual: String,
    },
    #[error("Pipeline capacity must satisfy 1 <= min ({min}) <= max ({max}) <= 96")]
    InvalidCapacity { min: u32, max: u32 },
    #[error("Invalid search domain: {0}")]
    InvalidDomain(String),
    #[error("Resource '{0}' is declared twice with different properties")]
    DuplicateResource(String),
    #[error("Failed to serialize stack: {0}")]
    Serialization(String),
}

/// Result type for stack operations.
pub type Result<T> = std::result::Result<T, StackError>;
