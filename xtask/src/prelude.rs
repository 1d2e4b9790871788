pub use anstream::print as aprint;
pub use anstream::println as aprintln;

/// Tokyo Night color palette
pub mod colors {
    pub const RESET: &str = "\x1b[0m";

    pub const TKN_RED: &str = "\x1b[38;2;247;118;142m"; // #f7768e
    pub const TKN_GREEN: &str = "\x1b[38;2;158;206;106m"; // #9ece6a
    pub const TKN_YELLOW: &str = "\x1b[38;2;224;175;104m"; // #e0af68
    pub const TKN_BLUE: &str = "\x1b[38;2;122;162;247m"; // #7aa2f7
    pub const TKN_MAGENTA: &str = "\x1b[38;2;187;154;247m"; // #bb9af7
    pub const TKN_CYAN: &str = "\x1b[38;2;125;207;255m"; // #7dcfff
}

fn paint(color: &str, text: &str) -> String {
    format!("{}{}{}", color, text, colors::RESET)
}

/// Success and "ok" markers.
pub fn p_g(text: &str) -> String {
    paint(colors::TKN_GREEN, text)
}

/// Findings and failures.
pub fn p_r(text: &str) -> String {
    paint(colors::TKN_RED, text)
}

pub fn p_b(text: &str) -> String {
    paint(colors::TKN_BLUE, text)
}

pub fn p_m(text: &str) -> String {
    paint(colors::TKN_MAGENTA, text)
}

/// Section headings.
pub fn p_c(text: &str) -> String {
    paint(colors::TKN_CYAN, text)
}

/// Colors a plan line by its change marker: `+` add, `-` remove, `~` update.
pub fn p_plan(line: &str) -> String {
    match line.chars().next() {
        Some('+') => p_g(line),
        Some('-') => p_r(line),
        Some('~') => paint(colors::TKN_YELLOW, line),
        _ => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_lines_are_colored_by_marker() {
        assert_eq!(p_plan("+ Create table: Todo"), p_g("+ Create table: Todo"));
        assert_eq!(
            p_plan("~ Update table: Todo"),
            format!("{}~ Update table: Todo{}", colors::TKN_YELLOW, colors::RESET)
        );
        assert_eq!(p_plan("- Delete"), p_r("- Delete"));
        assert_eq!(p_plan("= Table 'Todo' is up to date"), "= Table 'Todo' is up to date");
    }

    #[test]
    fn test_colored_text_is_reset() {
        let text = p_c("Deploy Plan:");
        assert!(text.starts_with(colors::TKN_CYAN));
        assert!(text.ends_with(colors::RESET));
    }
}
