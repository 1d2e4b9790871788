//! Change-pipeline configuration: table stream + export source, search sinks.

mod error;
mod mapping;
mod render;
mod types;
mod yaml;

pub use error::{PipelineError, Result};
pub use mapping::{IndexTemplate, SearchFieldType};
pub use render::{
    extract_template_blocks, render_pipeline_config, validate_pipeline, TEMPLATE_INDENT,
};
pub use types::{
    DocumentVersionType, PipelineConfig, SinkConfig, SourceConfig, StartPosition, DEFAULT_ACTION,
    DEFAULT_DOCUMENT_ID, DEFAULT_DOCUMENT_VERSION, PIPELINE_FORMAT_VERSION,
};
pub use yaml::{dedent_block, double_quoted, indent_block, single_quoted};
