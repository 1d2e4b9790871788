//! Search request construction (Functional Core).

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use super::error::{Result, SearchError};

/// Largest `from + size` the engine serves without a scroll.
pub const MAX_RESULT_WINDOW: u32 = 10_000;
/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Text field the match query runs against.
pub const SEARCH_FIELD: &str = "content";

/// A free-text search with pagination bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub from: u32,
    pub size: u32,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            from: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page(mut self, from: u32, size: u32) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.term.trim().is_empty() {
            return Err(SearchError::EmptyTerm);
        }
        let window = self.from.checked_add(self.size);
        if self.size == 0 || window.map_or(true, |w| w > MAX_RESULT_WINDOW) {
            return Err(SearchError::InvalidPagination {
                from: self.from,
                size: self.size,
            });
        }
        Ok(())
    }
}

/// Request the resolver issues against the search data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub operation: String,
    pub path: String,
    pub params: SearchParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub headers: BTreeMap<String, String>,
    pub query_string: BTreeMap<String, String>,
    pub body: serde_json::Value,
}

/// Builds a read-only match query against `index`.
pub fn build_search_request(index: &str, query: &SearchQuery) -> Result<SearchRequest> {
    query.validate()?;

    let mut query_string = BTreeMap::new();
    query_string.insert("pretty".to_string(), "true".to_string());

    Ok(SearchRequest {
        operation: "GET".to_string(),
        path: format!("/{}/_search", index),
        params: SearchParams {
            headers: BTreeMap::new(),
            query_string,
            body: json!({
                "from": query.from,
                "size": query.size,
                "query": { "match": { SEARCH_FIELD: query.term } }
            }),
        },
    })
}
