//! Projection of search responses into API records (Functional Core).

use serde::{Deserialize, Serialize};

use super::error::{Result, SearchError};
use super::types::{SearchResponse, Todo};

/// An error reported by the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamError {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured {
        #[serde(rename = "type")]
        error_type: String,
        reason: String,
    },
    Plain(String),
}

impl UpstreamError {
    /// Classifies an error response body. Structured engine errors keep their
    /// type and reason; anything else is reported verbatim under the status.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                error: ErrorDetail::Structured { error_type, reason },
            }) => Self {
                message: reason,
                error_type,
            },
            Ok(ErrorBody {
                error: ErrorDetail::Plain(message),
            }) => Self {
                message,
                error_type: format!("http_{}", status),
            },
            Err(_) => Self {
                message: if body.trim().is_empty() {
                    format!("search request failed with status {}", status)
                } else {
                    body.trim().to_string()
                },
                error_type: format!("http_{}", status),
            },
        }
    }
}

/// What the resolver sees after the request ran: either a result or an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverContext {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<UpstreamError>,
}

impl ResolverContext {
    pub fn success(result: serde_json::Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: UpstreamError) -> Self {
        Self {
            result: None,
            error: Some(error),
        }
    }
}

/// Projects each hit's stored source into a [`Todo`], in the order returned.
///
/// A reported error always wins: no partial data is returned alongside it.
pub fn resolve_response(ctx: ResolverContext) -> Result<Vec<Todo>> {
    if let Some(error) = ctx.error {
        return Err(SearchError::Upstream {
            message: error.message,
            error_type: error.error_type,
        });
    }

    let result = ctx
        .result
        .ok_or_else(|| SearchError::MalformedResponse("no result".to_string()))?;
    let response: SearchResponse = serde_json::from_value(result)
        .map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

    response
        .hits
        .hits
        .into_iter()
        .enumerate()
        .map(|(position, hit)| {
            let source = hit.source.ok_or_else(|| {
                SearchError::MalformedResponse(format!("hit {} has no _source", position))
            })?;
            serde_json::from_value(source).map_err(|e| {
                SearchError::MalformedResponse(format!("hit {}: {}", position, e))
            })
        })
        .collect()
}
