//! YAML scalar escaping and block re-indentation.

/// Prefixes every line of `text` with `width` spaces. Blank lines stay empty
/// so no trailing whitespace is introduced. A trailing newline is dropped.
pub fn indent_block(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strips `width` leading spaces from every line: the inverse of [`indent_block`].
pub fn dedent_block(text: &str, width: usize) -> String {
    text.lines()
        .map(|line| {
            let leading = line.len() - line.trim_start_matches(' ').len();
            &line[leading.min(width)..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders `value` as a YAML double-quoted scalar.
pub fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Renders `value` as a YAML single-quoted scalar. Used for expressions whose
/// `${...}` and double quotes must reach the runtime untouched.
pub fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_block_indents_every_line() {
        let text = "{\n  \"a\": [\n    1\n  ]\n}\n";
        assert_eq!(
            indent_block(text, 4),
            "    {\n      \"a\": [\n        1\n      ]\n    }"
        );
    }

    #[test]
    fn test_indent_block_keeps_blank_lines_empty() {
        assert_eq!(indent_block("a\n\nb", 2), "  a\n\n  b");
    }

    #[test]
    fn test_dedent_reverses_indent() {
        let text = "{\n  \"nested\": {\n    \"x\": true\n  }\n}";
        assert_eq!(dedent_block(&indent_block(text, 10), 10), text);
    }

    #[test]
    fn test_double_quoted_escapes() {
        assert_eq!(double_quoted("plain"), "\"plain\"");
        assert_eq!(double_quoted("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(double_quoted("line\nbreak"), "\"line\\nbreak\"");
    }

    #[test]
    fn test_single_quoted_doubles_quotes() {
        assert_eq!(
            single_quoted("${getMetadata(\"primary_key\")}"),
            "'${getMetadata(\"primary_key\")}'"
        );
        assert_eq!(single_quoted("it's"), "'it''s'");
    }
}
