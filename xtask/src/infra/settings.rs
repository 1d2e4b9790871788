//! Stack settings read from flags and the environment.

use todosearch_core::stack::StackInputs;

use super::error::{InfraError, Result};

/// Settings shared by every infra action. Flags override the environment.
#[derive(Debug, Clone, clap::Args)]
pub struct InfraSettings {
    /// Application name; prefixes resource names.
    #[arg(long, env = "TODOSEARCH_APP", default_value = "todosearch")]
    pub app: String,

    /// AWS account id owning the resources.
    #[arg(long, env = "TODOSEARCH_ACCOUNT")]
    pub account: Option<String>,

    /// Bucket receiving table snapshot exports.
    #[arg(long, env = "TODOSEARCH_BUCKET")]
    pub bucket: Option<String>,

    /// Key prefix of snapshot exports (defaults to the table name).
    #[arg(long, env = "TODOSEARCH_EXPORT_PREFIX")]
    pub export_prefix: Option<String>,

    /// Ingestion pipeline name.
    #[arg(long, env = "TODOSEARCH_PIPELINE")]
    pub pipeline: Option<String>,

    /// Search domain endpoint host, when already known.
    #[arg(long, env = "TODOSEARCH_DOMAIN_ENDPOINT")]
    pub domain_endpoint: Option<String>,
}

impl InfraSettings {
    /// Builds stack inputs for `region`.
    pub fn to_inputs(&self, region: &str) -> Result<StackInputs> {
        let account = self
            .account
            .as_deref()
            .ok_or(InfraError::MissingSetting("TODOSEARCH_ACCOUNT"))?;
        let bucket = self
            .bucket
            .clone()
            .unwrap_or_else(|| format!("{}-{}-exports", self.app, account));

        let mut inputs = StackInputs::todo(&self.app, region, account, &bucket);
        if let Some(prefix) = &self.export_prefix {
            inputs = inputs.with_export_prefix(prefix);
        }
        if let Some(name) = &self.pipeline {
            inputs.pipeline.name = name.clone();
        }
        if self.domain_endpoint.is_some() {
            inputs.domain.endpoint = self.domain_endpoint.clone();
        }
        Ok(inputs)
    }
}
