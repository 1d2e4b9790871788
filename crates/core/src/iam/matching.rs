//! IAM wildcard matching.
//!
//! Actions and resources may contain `*` (any run of characters, including
//! none) and `?` (exactly one character). Action names are case-insensitive,
//! resource ARNs are case-sensitive.

/// Returns true if `action` is covered by `pattern`.
pub fn action_matches(pattern: &str, action: &str) -> bool {
    glob_matches(
        pattern.to_ascii_lowercase().as_bytes(),
        action.to_ascii_lowercase().as_bytes(),
    )
}

/// Returns true if `resource` is covered by `pattern`.
pub fn resource_matches(pattern: &str, resource: &str) -> bool {
    glob_matches(pattern.as_bytes(), resource.as_bytes())
}

/// Iterative glob matcher with single-star backtracking.
fn glob_matches(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut star_text = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == b'?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            star_text = t;
            p += 1;
        } else if let Some(star_pos) = star {
            p = star_pos + 1;
            star_text += 1;
            t = star_text;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_action_match_ignores_case() {
        assert!(action_matches("es:ESHttpGet", "es:eshttpget"));
        assert!(!action_matches("es:ESHttpGet", "es:ESHttpPut"));
    }

    #[test]
    fn test_action_wildcards() {
        assert!(action_matches("es:ESHttp*", "es:ESHttpDelete"));
        assert!(action_matches("*", "dynamodb:GetRecords"));
        assert!(action_matches("dynamodb:Describe*", "dynamodb:DescribeStream"));
        assert!(!action_matches("dynamodb:Describe*", "dynamodb:GetRecords"));
        assert!(action_matches("s3:?etObject", "s3:GetObject"));
    }

    #[test]
    fn test_resource_wildcards() {
        let table = "arn:aws:dynamodb:us-east-1:123456789012:table/Todo";
        assert!(resource_matches(table, table));
        assert!(resource_matches(
            "arn:aws:dynamodb:us-east-1:123456789012:table/Todo/stream/*",
            "arn:aws:dynamodb:us-east-1:123456789012:table/Todo/stream/2024-01-01T00:00:00.000"
        ));
        assert!(!resource_matches(
            "arn:aws:dynamodb:us-east-1:123456789012:table/Todo/stream/*",
            table
        ));
        assert!(resource_matches("*", table));
    }

    #[test]
    fn test_resource_is_case_sensitive() {
        assert!(!resource_matches("arn:aws:s3:::Bucket/*", "arn:aws:s3:::bucket/x"));
    }

    #[test]
    fn test_star_matches_empty_and_backtracks() {
        assert!(resource_matches("a*b*c", "abc"));
        assert!(resource_matches("a*b*c", "axxbyyc"));
        assert!(!resource_matches("a*b*c", "axxbyy"));
        assert!(resource_matches("a**", "a"));
    }
}
