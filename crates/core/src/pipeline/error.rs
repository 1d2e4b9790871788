use thiserror::Error;

use crate::arn::ArnError;

/// Configuration-time errors raised before a pipeline document is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Unsupported stream start position '{0}': only LATEST is supported")]
    UnsupportedStartPosition(String),
    #[error("Pipeline '{0}' has no sinks")]
    NoSinks(String),
    #[error("Invalid pipeline name '{0}': use 3-28 lowercase letters, digits or hyphens, starting with a letter")]
    InvalidName(String),
    #[error("{context} role '{arn}' is not an IAM role ARN")]
    NotARole { context: String, arn: String },
    #[error(transparent)]
    Arn(#[from] ArnError),
    #[error("Sink #{sink} has no hosts")]
    NoHosts { sink: usize },
    #[error("Sink #{sink} host '{host}' must be a fully qualified https endpoint")]
    InsecureHost { sink: usize, host: String },
    #[error("Sink #{sink} bulk size must be greater than zero")]
    InvalidBulkSize { sink: usize },
    #[error("Sink #{sink} index name '{index}' is invalid")]
    InvalidIndexName { sink: usize, index: String },
    #[error("Index '{index}' on {host} is targeted by more than one sink")]
    DuplicateIndex { host: String, index: String },
    #[error("{context} region must not be empty")]
    EmptyRegion { context: String },
    #[error("Sink #{sink} has an empty {field} expression")]
    EmptyExpression { sink: usize, field: &'static str },
    #[error("Export bucket name must not be empty")]
    EmptyExportBucket,
    #[error("Failed to serialize index template: {0}")]
    Serialization(String),
    #[error("Invalid index template: {0}")]
    InvalidTemplate(String),
    #[error("Index template does not match model {model}: {details}")]
    MappingMismatch { model: String, details: String },
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
