//! Common utilities for Rust code generation.
//!
//! This module provides shared helper functions used across normalization and emission.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::names::depunct;

/// Rust keywords (strict and reserved) that cannot be used as plain identifiers.
pub static RUST_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "as", "async", "await", "become", "box", "break", "const", "continue", "crate", "do",
        "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
        "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
        "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
        "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
    ]
    .into_iter()
    .collect()
});

/// Sanitize an API name into a snake_case Rust identifier.
/// - `-`, `.`, `$`, `/` act as word separators
/// - anything else outside `[A-Za-z0-9_]` is dropped
/// - a leading digit gets a `_` prefix
/// - reserved words get a `_` suffix (`type` -> `type_`)
pub fn sanitize_rust_identifier(name: &str) -> String {
    let cleaned: String = depunct(name, false)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let mut result = to_snake_case(&cleaned);

    if result.is_empty() {
        return "_empty".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    if RUST_RESERVED_WORDS.contains(result.as_str()) {
        result.push('_');
    }
    result
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Convert camelCase or PascalCase to snake_case, keeping acronyms together
/// (`maxResults` -> `max_results`, `userIPAddress` -> `user_ip_address`).
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// `DriveReadonlyScope` -> `DRIVE_READONLY_SCOPE`.
pub fn to_screaming_snake(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

/// Escape a string for use inside a Rust string literal.
pub fn escape_rust_string(s: &str) -> String {
    s.escape_debug().to_string()
}

/// Render `text` as `///` doc lines, wrapped at 70 columns of text.
pub fn doc_lines(text: &str) -> Vec<String> {
    const MAX_LEN: usize = 70;
    let mut lines = Vec::new();
    for paragraph in text.trim().lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > MAX_LEN {
                lines.push(format!("/// {line}"));
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if line.is_empty() {
            lines.push("///".to_string());
        } else {
            lines.push(format!("/// {line}"));
        }
    }
    lines
}

/// Indent every non-empty line of `code` by `levels` * 4 spaces.
pub fn indent(code: &str, levels: usize) -> String {
    let pad = "    ".repeat(levels);
    code.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_rust_identifier() {
        assert_eq!(sanitize_rust_identifier("foo"), "foo");
        assert_eq!(sanitize_rust_identifier("maxResults"), "max_results");
        assert_eq!(sanitize_rust_identifier("max-results"), "max_results");
        assert_eq!(sanitize_rust_identifier("type"), "type_");
        assert_eq!(sanitize_rust_identifier("self"), "self_");
        assert_eq!(sanitize_rust_identifier("123foo"), "_123foo");
        assert_eq!(sanitize_rust_identifier("@type"), "type_");
        assert_eq!(sanitize_rust_identifier("$.xgafv"), "xgafv");
        assert_eq!(sanitize_rust_identifier("%%"), "_empty");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("fooBar"), "foo_bar");
        assert_eq!(to_snake_case("FooBar"), "foo_bar");
        assert_eq!(to_snake_case("userIPAddress"), "user_ip_address");
        assert_eq!(to_snake_case("etag"), "etag");
        assert_eq!(to_snake_case("v2Beta"), "v2_beta");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_to_screaming_snake() {
        assert_eq!(to_screaming_snake("DriveReadonlyScope"), "DRIVE_READONLY_SCOPE");
        assert_eq!(to_screaming_snake("CloudPlatformScope"), "CLOUD_PLATFORM_SCOPE");
    }

    #[test]
    fn test_escape_rust_string() {
        assert_eq!(escape_rust_string("hello"), "hello");
        assert_eq!(escape_rust_string("a\"b"), "a\\\"b");
        assert_eq!(escape_rust_string("a\\b"), "a\\\\b");
        assert_eq!(escape_rust_string("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_doc_lines_wrap() {
        let text = "The maximum number of results to return in a single page of the listing, between one and one hundred.";
        let lines = doc_lines(text);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("/// ")));
        assert!(lines[0].len() <= 74);
        assert_eq!(doc_lines("a\n\nb"), vec!["/// a", "///", "/// b"]);
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("items"), "Items");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\n\nb", 1), "    a\n\n    b");
    }
}
