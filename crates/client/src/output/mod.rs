//! Output formatting functions.

pub mod json;
pub mod pretty;

use todosearch_core::search::Todo;

use crate::cli::OutputFormat;

/// Format a value for output.
pub fn format_output<T: serde::Serialize>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_json(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Format search results: one JSON document per hit, or a readable listing.
pub fn format_todos(todos: &[Todo], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_json_lines(todos),
        OutputFormat::Pretty => pretty::format_todos(todos),
    }
}
