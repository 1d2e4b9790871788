//! JSON output formatting.

use serde::Serialize;

/// Format a value as compact JSON.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Format each item as one compact JSON document per line.
pub fn format_json_lines<T: Serialize>(items: &[T]) -> String {
    items
        .iter()
        .map(format_json)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_lines() {
        let items = vec![json!({ "id": "a" }), json!({ "id": "b" })];
        assert_eq!(format_json_lines(&items), "{\"id\":\"a\"}\n{\"id\":\"b\"}");
        assert_eq!(format_json_lines::<serde_json::Value>(&[]), "");
    }
}
