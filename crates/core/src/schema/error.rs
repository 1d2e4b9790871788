use thiserror::Error;

/// Errors found while validating a schema declaration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate type name: {0}")]
    DuplicateType(String),
    #[error("Duplicate field '{field}' on model {model}")]
    DuplicateField { model: String, field: String },
    #[error("Field '{field}' on model {model} is reserved")]
    ReservedField { model: String, field: String },
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("Model {model} references unknown enum {enum_name}")]
    UnknownEnum { model: String, enum_name: String },
    #[error("Enum {0} has no values")]
    EmptyEnum(String),
    #[error("Enum {enum_name} repeats value '{value}'")]
    DuplicateEnumValue { enum_name: String, value: String },
    #[error("Query {query} returns unknown model {model}")]
    UnknownModel { query: String, model: String },
    #[error("{0} has no authorization rules")]
    MissingAuthorization(String),
    #[error("API key expiry must be between 1 and 365 days, got {0}")]
    InvalidApiKeyExpiry(u32),
}

/// Errors that can occur when checking a table configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Point-in-time recovery is disabled on table '{0}'; the snapshot export would fail")]
    PointInTimeRecoveryDisabled(String),
    #[error("Table '{0}' has no change stream")]
    StreamDisabled(String),
    #[error("Table '{table_name}' streams {actual} images, expected NEW_IMAGE")]
    WrongStreamView {
        table_name: String,
        actual: &'static str,
    },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
