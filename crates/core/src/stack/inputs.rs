//! Immutable stack inputs (Functional Core - pure data).

use serde::{Deserialize, Serialize};

use super::error::{Result, StackError};
use crate::schema::{todo_schema, Schema};

/// Deletion behavior when the stack is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    Destroy,
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EbsVolumeType {
    Gp2,
    Gp3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbsOptions {
    pub volume_size_gib: u32,
    pub volume_type: EbsVolumeType,
}

/// Search domain settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub name: String,
    pub engine_version: String,
    pub node_to_node_encryption: bool,
    pub encryption_at_rest: bool,
    pub data_nodes: u32,
    pub data_node_instance_type: String,
    pub master_nodes: u32,
    pub ebs: EbsOptions,
    pub removal_policy: RemovalPolicy,
    /// Explicit endpoint host; derived from name and region when absent.
    pub endpoint: Option<String>,
}

impl DomainConfig {
    /// A single-node encrypted development domain.
    pub fn development(name: &str) -> Self {
        Self {
            name: name.to_string(),
            engine_version: "OpenSearch_2.3".to_string(),
            node_to_node_encryption: true,
            encryption_at_rest: true,
            data_nodes: 1,
            data_node_instance_type: "t3.small.search".to_string(),
            master_nodes: 0,
            ebs: EbsOptions {
                volume_size_gib: 10,
                volume_type: EbsVolumeType::Gp3,
            },
            removal_policy: RemovalPolicy::Destroy,
            endpoint: None,
        }
    }

    /// Fully qualified https endpoint of the domain.
    pub fn endpoint_url(&self, region: &str) -> String {
        match &self.endpoint {
            Some(host) if host.starts_with("https://") => host.trim_end_matches('/').to_string(),
            Some(host) => format!("https://{}", host.trim_end_matches('/')),
            None => format!("https://search-{}.{}.es.amazonaws.com", self.name, region),
        }
    }

    /// Domain names: 3-28 chars, lowercase letters, digits and hyphens,
    /// starting with a letter.
    pub fn validate(&self) -> Result<()> {
        let valid_name = (3..=28).contains(&self.name.len())
            && self.name.starts_with(|c: char| c.is_ascii_lowercase())
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_name {
            return Err(StackError::InvalidDomain(format!(
                "invalid name '{}'",
                self.name
            )));
        }
        if self.data_nodes == 0 {
            return Err(StackError::InvalidDomain(
                "at least one data node is required".to_string(),
            ));
        }
        if self.ebs.volume_size_gib < 10 {
            return Err(StackError::InvalidDomain(format!(
                "EBS volume of {} GiB is below the 10 GiB minimum",
                self.ebs.volume_size_gib
            )));
        }
        Ok(())
    }
}

/// Ingestion pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub name: String,
    pub index: String,
    pub min_units: u32,
    pub max_units: u32,
    pub bulk_size: u32,
    pub logging_enabled: bool,
}

impl PipelineSettings {
    pub fn new(name: &str, index: &str) -> Self {
        Self {
            name: name.to_string(),
            index: index.to_string(),
            min_units: 1,
            max_units: 4,
            bulk_size: 4,
            logging_enabled: true,
        }
    }

    pub fn log_group_name(&self) -> String {
        format!("/aws/vendedlogs/OpenSearchService/pipelines/{}", self.name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_units < 1 || self.min_units > self.max_units || self.max_units > 96 {
            return Err(StackError::InvalidCapacity {
                min: self.min_units,
                max: self.max_units,
            });
        }
        Ok(())
    }
}

/// Everything a stack is built from. Builders only read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackInputs {
    pub app_name: String,
    pub region: String,
    pub account: String,
    pub schema: Schema,
    /// Model replicated into the search index.
    pub model: String,
    pub bucket_name: String,
    /// Export key prefix; defaults to the table name.
    pub export_prefix: Option<String>,
    pub domain: DomainConfig,
    pub pipeline: PipelineSettings,
}

impl StackInputs {
    /// Inputs for the Todo search backend with development defaults.
    pub fn todo(app_name: &str, region: &str, account: &str, bucket_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            region: region.to_string(),
            account: account.to_string(),
            schema: todo_schema(),
            model: "Todo".to_string(),
            bucket_name: bucket_name.to_string(),
            export_prefix: None,
            domain: DomainConfig::development(&format!("{}-search", app_name)),
            pipeline: PipelineSettings::new(&format!("{}-todo-pipeline", app_name), "todo"),
        }
    }

    pub fn with_export_prefix(mut self, prefix: &str) -> Self {
        self.export_prefix = Some(prefix.to_string());
        self
    }

    /// Name of the pipeline role, e.g. `todoapp` -> `TodoappPipelineRole`.
    pub fn role_name(&self) -> String {
        let mut chars = self.app_name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        };
        format!("{}PipelineRole", capitalized.replace(['-', '_'], ""))
    }
}
