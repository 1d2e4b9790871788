use thiserror::Error;

/// Errors surfaced by the search resolver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The search engine reported an error; message and type are passed through.
    #[error("{error_type}: {message}")]
    Upstream { message: String, error_type: String },
    #[error("Invalid pagination: from={from}, size={size}")]
    InvalidPagination { from: u32, size: u32 },
    #[error("Search term must not be empty")]
    EmptyTerm,
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
