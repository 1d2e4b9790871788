//! HTTP client for the search endpoint.

pub mod health;
pub mod search;

use todosearch_core::search::{resolve_response, ResolverContext, Todo, UpstreamError};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Default index holding the replicated todos.
pub const DEFAULT_INDEX: &str = "todo";

/// HTTP client for the search endpoint.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    base_url: String,
    index: String,
}

impl SearchClient {
    /// Create a new client for `index` at the given base URL.
    pub fn new(base_url: impl Into<String>, index: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|_| ClientError::InvalidBaseUrl(base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.into(),
        })
    }

    /// Create from environment (TODOSEARCH_SEARCH_URL and TODOSEARCH_INDEX, or defaults).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("TODOSEARCH_SEARCH_URL")
            .unwrap_or_else(|_| "http://localhost:9200".to_string());
        let index = std::env::var("TODOSEARCH_INDEX").unwrap_or_else(|_| DEFAULT_INDEX.to_string());
        Self::new(base_url, index)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Handle error responses.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(ClientError::from)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Feed a search response through the resolver: errors reported by the
    /// engine surface as [`todosearch_core::search::SearchError::Upstream`].
    async fn resolve(&self, response: reqwest::Response) -> Result<Vec<Todo>> {
        let status = response.status();
        let ctx = if status.is_success() {
            ResolverContext::success(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Search endpoint returned an error");
            ResolverContext::failure(UpstreamError::from_response_body(status.as_u16(), &body))
        };
        Ok(resolve_response(ctx)?)
    }
}
