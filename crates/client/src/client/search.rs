//! Search operations.

use reqwest::Method;
use todosearch_core::search::{build_search_request, SearchQuery, SearchRequest, Todo};
use tracing::debug;

use super::SearchClient;
use crate::error::{ClientError, Result};

impl SearchClient {
    /// Run a content search and return the matching todos in relevance order.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Todo>> {
        let request = build_search_request(&self.index, query)?;
        debug!(
            path = %request.path,
            from = query.from,
            size = query.size,
            "Sending search request"
        );
        let response = self.send(&request).await?;
        let todos = self.resolve(response).await?;
        debug!(hits = todos.len(), "Search resolved");
        Ok(todos)
    }

    async fn send(&self, request: &SearchRequest) -> Result<reqwest::Response> {
        let method = Method::from_bytes(request.operation.as_bytes())
            .map_err(|_| ClientError::UnsupportedMethod(request.operation.clone()))?;

        let mut builder = self
            .client
            .request(method, self.url(&request.path))
            .query(&request.params.query_string)
            .json(&request.params.body);
        for (name, value) in &request.params.headers {
            builder = builder.header(name, value);
        }
        Ok(builder.send().await?)
    }
}
