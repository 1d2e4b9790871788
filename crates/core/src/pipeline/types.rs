//! Pipeline configuration types (Functional Core - pure data).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::mapping::IndexTemplate;
use crate::arn::Arn;

/// Pipeline configuration format version understood by the ingestion runtime.
pub const PIPELINE_FORMAT_VERSION: &str = "2";

/// Document id taken from the table's primary key.
pub const DEFAULT_DOCUMENT_ID: &str = "${getMetadata(\"primary_key\")}";
/// Index/delete action derived from the change-stream event.
pub const DEFAULT_ACTION: &str = "${getMetadata(\"opensearch_action\")}";
/// Monotonic per-record version derived from the change-stream event.
pub const DEFAULT_DOCUMENT_VERSION: &str = "${getMetadata(\"document_version\")}";

/// Where the stream leg starts reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartPosition {
    /// Only events after the export snapshot; the export covers the rest.
    #[default]
    Latest,
}

impl StartPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartPosition::Latest => "LATEST",
        }
    }
}

impl fmt::Display for StartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartPosition {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LATEST" => Ok(StartPosition::Latest),
            _ => Err(PipelineError::UnsupportedStartPosition(s.to_string())),
        }
    }
}

/// How the sink orders document versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentVersionType {
    /// The supplied version must be greater than the stored one, so a late
    /// change event can never regress a document.
    #[default]
    External,
}

impl DocumentVersionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentVersionType::External => "external",
        }
    }
}

/// The table change stream plus point-in-time export feeding the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub table_arn: Arn,
    pub role_arn: Arn,
    pub region: String,
    pub start_position: StartPosition,
    pub export_bucket: String,
    /// Object key prefix of the snapshot export, conventionally `{table}/`.
    pub export_prefix: String,
    /// End-to-end acknowledgments: records are only checkpointed once written.
    pub acknowledgments: bool,
}

impl SourceConfig {
    pub fn new(table_arn: Arn, role_arn: Arn, region: &str, export_bucket: &str) -> Self {
        let export_prefix = format!("{}/", table_arn.resource_name());
        Self {
            table_arn,
            role_arn,
            region: region.to_string(),
            start_position: StartPosition::Latest,
            export_bucket: export_bucket.to_string(),
            export_prefix,
            acknowledgments: true,
        }
    }

    pub fn with_export_prefix(mut self, prefix: &str) -> Self {
        self.export_prefix = prefix.to_string();
        self
    }
}

/// One search index the pipeline writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    pub hosts: Vec<String>,
    pub index: String,
    pub template: IndexTemplate,
    pub document_id: String,
    pub action: String,
    pub document_version: String,
    pub document_version_type: DocumentVersionType,
    pub bulk_size: u32,
    pub role_arn: Arn,
    pub region: String,
}

impl SinkConfig {
    /// A sink with the default metadata expressions and a bulk size of 4.
    pub fn new(
        host: &str,
        index: &str,
        template: IndexTemplate,
        role_arn: Arn,
        region: &str,
    ) -> Self {
        Self {
            hosts: vec![host.to_string()],
            index: index.to_string(),
            template,
            document_id: DEFAULT_DOCUMENT_ID.to_string(),
            action: DEFAULT_ACTION.to_string(),
            document_version: DEFAULT_DOCUMENT_VERSION.to_string(),
            document_version_type: DocumentVersionType::External,
            bulk_size: 4,
            role_arn,
            region: region.to_string(),
        }
    }

    pub fn with_bulk_size(mut self, bulk_size: u32) -> Self {
        self.bulk_size = bulk_size;
        self
    }
}

/// A complete pipeline: one source, one or more sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub name: String,
    pub source: SourceConfig,
    pub sinks: Vec<SinkConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position_parses_latest_only() {
        assert_eq!("LATEST".parse::<StartPosition>(), Ok(StartPosition::Latest));
        assert_eq!("latest".parse::<StartPosition>(), Ok(StartPosition::Latest));
        assert_eq!(
            "TRIM_HORIZON".parse::<StartPosition>(),
            Err(PipelineError::UnsupportedStartPosition(
                "TRIM_HORIZON".to_string()
            ))
        );
        assert!("EARLIEST".parse::<StartPosition>().is_err());
    }

    #[test]
    fn test_source_defaults_export_prefix_to_table_name() {
        let source = SourceConfig::new(
            Arn::dynamodb_table("us-east-1", "123456789012", "Todo"),
            Arn::iam_role("123456789012", "PipelineRole"),
            "us-east-1",
            "todo-exports",
        );
        assert_eq!(source.export_prefix, "Todo/");
        assert!(source.acknowledgments);
        assert_eq!(source.start_position, StartPosition::Latest);
    }

    #[test]
    fn test_sink_defaults() {
        let sink = SinkConfig::new(
            "https://search.example.com",
            "todo",
            IndexTemplate::for_model(&crate::schema::todo_model()),
            Arn::iam_role("123456789012", "PipelineRole"),
            "us-east-1",
        );
        assert_eq!(sink.document_id, "${getMetadata(\"primary_key\")}");
        assert_eq!(sink.document_version_type.as_str(), "external");
        assert_eq!(sink.bulk_size, 4);
    }

    #[test]
    fn test_unknown_sink_keys_are_rejected() {
        let sink = SinkConfig::new(
            "https://search.example.com",
            "todo",
            IndexTemplate::for_model(&crate::schema::todo_model()),
            Arn::iam_role("123456789012", "PipelineRole"),
            "us-east-1",
        );
        let mut value = serde_json::to_value(&sink).unwrap();
        let back: SinkConfig = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back, sink);

        value["bulksize"] = serde_json::json!(8);
        assert!(serde_json::from_value::<SinkConfig>(value).is_err());
    }
}
