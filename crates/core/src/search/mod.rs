//! Full-text search resolver: request construction and response projection.
//!
//! The resolver itself runs inside the API's managed runtime. These functions
//! describe what it sends and how it reshapes the answer, so the sink mapping
//! (index name, field names) can be checked against them.

mod error;
mod request;
mod response;
mod types;

pub use error::{Result, SearchError};
pub use request::{
    build_search_request, SearchParams, SearchQuery, SearchRequest, DEFAULT_PAGE_SIZE,
    MAX_RESULT_WINDOW, SEARCH_FIELD,
};
pub use response::{resolve_response, ResolverContext, UpstreamError};
pub use types::{Hit, Hits, Priority, SearchResponse, Todo, TotalHits};
