//! Pipeline document rendering (Functional Core).
//!
//! Rendering happens in two stages. Each sink's index template is first
//! serialized on its own with `serde_json`; the resulting block is then
//! re-indented to the nesting level of `template_content` and spliced under a
//! YAML literal block scalar. Every other value goes through a YAML scalar
//! quoting helper, so no interpolated value can break the outer structure.

use std::collections::HashSet;

use url::Url;

use super::error::{PipelineError, Result};
use super::types::{PipelineConfig, SinkConfig, PIPELINE_FORMAT_VERSION};
use super::yaml::{double_quoted, indent_block, single_quoted};
use crate::arn::Arn;

/// Column at which the embedded index template starts:
/// `template_content: |` sits at 8, its block one level deeper.
pub const TEMPLATE_INDENT: usize = 10;

/// Checks everything that can be checked before handing the document to the
/// ingestion runtime.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<()> {
    validate_name(&config.name)?;

    let source = &config.source;
    config.source.table_arn.expect_service("dynamodb")?;
    validate_role(&source.role_arn, "Source")?;
    if source.region.trim().is_empty() {
        return Err(PipelineError::EmptyRegion {
            context: "Source".to_string(),
        });
    }
    if source.export_bucket.trim().is_empty() {
        return Err(PipelineError::EmptyExportBucket);
    }

    if config.sinks.is_empty() {
        return Err(PipelineError::NoSinks(config.name.clone()));
    }

    let mut targets = HashSet::new();
    for (index, sink) in config.sinks.iter().enumerate() {
        validate_sink(index, sink)?;
        for host in &sink.hosts {
            if !targets.insert((host.trim_end_matches('/'), sink.index.as_str())) {
                return Err(PipelineError::DuplicateIndex {
                    host: host.clone(),
                    index: sink.index.clone(),
                });
            }
        }
    }

    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    let valid = (3..=28).contains(&name.len())
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PipelineError::InvalidName(name.to_string()))
    }
}

fn validate_role(arn: &Arn, context: &str) -> Result<()> {
    if arn.service != "iam" || !arn.resource.starts_with("role/") {
        return Err(PipelineError::NotARole {
            context: context.to_string(),
            arn: arn.to_string(),
        });
    }
    Ok(())
}

fn validate_sink(index: usize, sink: &SinkConfig) -> Result<()> {
    if sink.hosts.is_empty() {
        return Err(PipelineError::NoHosts { sink: index });
    }
    for host in &sink.hosts {
        if !is_secure_endpoint(host) {
            return Err(PipelineError::InsecureHost {
                sink: index,
                host: host.clone(),
            });
        }
    }

    if !is_valid_index_name(&sink.index) {
        return Err(PipelineError::InvalidIndexName {
            sink: index,
            index: sink.index.clone(),
        });
    }
    if sink.bulk_size == 0 {
        return Err(PipelineError::InvalidBulkSize { sink: index });
    }

    let expressions = [
        ("document_id", &sink.document_id),
        ("action", &sink.action),
        ("document_version", &sink.document_version),
    ];
    for (field, expression) in expressions {
        if expression.trim().is_empty() {
            return Err(PipelineError::EmptyExpression { sink: index, field });
        }
    }

    validate_role(&sink.role_arn, &format!("Sink #{}", index))?;
    if sink.region.trim().is_empty() {
        return Err(PipelineError::EmptyRegion {
            context: format!("Sink #{}", index),
        });
    }
    Ok(())
}

/// `https://` with a dotted host name and nothing after the authority.
fn is_secure_endpoint(host: &str) -> bool {
    match Url::parse(host) {
        Ok(url) => {
            url.scheme() == "https"
                && url.host_str().is_some_and(|h| h.contains('.'))
                && url.path().trim_end_matches('/').is_empty()
                && url.query().is_none()
        }
        Err(_) => false,
    }
}

/// Lowercase, no leading `_`, `-` or `+`, none of the characters the engine rejects.
fn is_valid_index_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 255
        && name != "."
        && name != ".."
        && !name.starts_with(['_', '-', '+'])
        && name.chars().all(|c| {
            !c.is_ascii_uppercase()
                && !c.is_whitespace()
                && !matches!(c, '\\' | '/' | '*' | '?' | '"' | '<' | '>' | '|' | ',' | '#' | ':')
        })
}

/// Renders the pipeline document consumed by the ingestion runtime.
///
/// The configuration is validated first; identical inputs always produce
/// byte-identical output.
pub fn render_pipeline_config(config: &PipelineConfig) -> Result<String> {
    validate_pipeline(config)?;

    let source = &config.source;
    let mut lines = vec![
        format!("version: {}", double_quoted(PIPELINE_FORMAT_VERSION)),
        format!("{}:", config.name),
        "  source:".to_string(),
        "    dynamodb:".to_string(),
        format!("      acknowledgments: {}", source.acknowledgments),
        "      tables:".to_string(),
        format!(
            "        - table_arn: {}",
            double_quoted(&source.table_arn.to_string())
        ),
        "          stream:".to_string(),
        format!(
            "            start_position: {}",
            double_quoted(source.start_position.as_str())
        ),
        "          export:".to_string(),
        format!("            s3_bucket: {}", double_quoted(&source.export_bucket)),
        format!("            s3_region: {}", double_quoted(&source.region)),
        format!("            s3_prefix: {}", double_quoted(&source.export_prefix)),
        "      aws:".to_string(),
        format!(
            "        sts_role_arn: {}",
            double_quoted(&source.role_arn.to_string())
        ),
        format!("        region: {}", double_quoted(&source.region)),
        "  sink:".to_string(),
    ];
    for sink in &config.sinks {
        lines.extend(render_sink(sink)?);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

fn render_sink(sink: &SinkConfig) -> Result<Vec<String>> {
    let template = sink.template.to_json_pretty()?;

    let mut lines = vec!["    - opensearch:".to_string(), "        hosts:".to_string()];
    for host in &sink.hosts {
        lines.push(format!("          - {}", double_quoted(host)));
    }
    lines.extend([
        format!("        index: {}", double_quoted(&sink.index)),
        format!("        index_type: {}", double_quoted("custom")),
        "        template_content: |".to_string(),
        indent_block(&template, TEMPLATE_INDENT),
        format!("        document_id: {}", single_quoted(&sink.document_id)),
        format!("        action: {}", single_quoted(&sink.action)),
        format!(
            "        document_version: {}",
            single_quoted(&sink.document_version)
        ),
        format!(
            "        document_version_type: {}",
            double_quoted(sink.document_version_type.as_str())
        ),
        format!("        bulk_size: {}", sink.bulk_size),
        "        aws:".to_string(),
        format!(
            "          sts_role_arn: {}",
            double_quoted(&sink.role_arn.to_string())
        ),
        format!("          region: {}", double_quoted(&sink.region)),
    ]);
    Ok(lines)
}

/// Extracts the embedded `template_content` blocks of a rendered document, in
/// sink order, with the splice indentation removed.
pub fn extract_template_blocks(rendered: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in rendered.lines() {
        if let Some(lines) = current.as_mut() {
            let indent = line.len() - line.trim_start().len();
            if line.trim().is_empty() || indent >= TEMPLATE_INDENT {
                lines.push(line);
                continue;
            }
            blocks.push(super::yaml::dedent_block(&lines.join("\n"), TEMPLATE_INDENT));
            current = None;
        }
        if line.trim_start() == "template_content: |" {
            current = Some(Vec::new());
        }
    }
    if let Some(lines) = current {
        blocks.push(super::yaml::dedent_block(&lines.join("\n"), TEMPLATE_INDENT));
    }

    blocks
}
