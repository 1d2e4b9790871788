//! Health check operations.

use super::SearchClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Cluster health summary.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
    pub number_of_nodes: u32,
    #[serde(default)]
    pub active_shards: u32,
}

/// Whether an index exists on the cluster.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexStatus {
    pub index: String,
    pub exists: bool,
}

impl SearchClient {
    /// Check cluster health.
    pub async fn health_cluster(&self) -> Result<ClusterHealth> {
        let response = self
            .client
            .get(self.url("/_cluster/health"))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Check whether the configured index exists.
    pub async fn health_index(&self) -> Result<IndexStatus> {
        let response = self
            .client
            .head(self.url(&format!("/{}", self.index)))
            .send()
            .await?;
        Ok(IndexStatus {
            index: self.index.clone(),
            exists: response.status().is_success(),
        })
    }
}
