// Fri Oct 16 2026 - Alex

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SCOPE_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*::\s*").unwrap());
static OPEN_ANGLE_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*<\s*").unwrap());
static CLOSE_ANGLE_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+>").unwrap());
static COMMA_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());
static INDIRECTION_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([*&])").unwrap());

pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Canonical spelling used for every stored fully-qualified name:
/// single spaces, no spaces around `::`, inside angle brackets or before
/// `*`/`&`, and `", "` between template arguments.
pub fn canonicalize(s: &str) -> String {
    let collapsed = collapse_whitespace(s);
    let scoped = SCOPE_SPACING.replace_all(&collapsed, "::");
    let opened = OPEN_ANGLE_SPACING.replace_all(&scoped, "<");
    let closed = CLOSE_ANGLE_SPACING.replace_all(&opened, ">");
    let commas = COMMA_SPACING.replace_all(&closed, ", ");
    INDIRECTION_SPACING.replace_all(&commas, "$1").into_owned()
}

/// Removes every balanced `<...>` group, keeping the scope structure:
/// `ns::Table<Key<int>>::Node` becomes `ns::Table::Node`.
pub fn strip_template_arguments(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut depth = 0usize;

    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' if depth > 0 => depth -= 1,
            _ if depth == 0 => result.push(c),
            _ => {}
        }
    }

    result.trim().to_string()
}

/// Splits on `::` outside template argument lists
pub fn split_scopes(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' if depth > 0 => depth -= 1,
            b':' if depth == 0 && i + 1 < bytes.len() && bytes[i + 1] == b':' => {
                parts.push(&s[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&s[start..]);

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

pub fn last_segment(name: &str) -> &str {
    split_scopes(name).last().copied().unwrap_or(name)
}

pub fn qualify(namespace: &str, name: &str) -> String {
    let name = name.strip_prefix("::").unwrap_or(name);
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", namespace, name)
    }
}

/// `a::b::c` yields `a::b::c`, `a::b`, `a` (innermost first)
pub fn enclosing_scopes(namespace: &str) -> Vec<String> {
    let parts = split_scopes(namespace);
    (1..=parts.len())
        .rev()
        .map(|len| parts[..len].join("::"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_spacing() {
        assert_eq!(canonicalize("unsigned  int"), "unsigned int");
        assert_eq!(canonicalize(" ns :: Foo < int , char * > "), "ns::Foo<int, char*>");
        assert_eq!(canonicalize("Map<Key<int> >"), "Map<Key<int>>");
        assert_eq!(canonicalize("Foo *"), "Foo*");
    }

    #[test]
    fn test_strip_template_arguments() {
        assert_eq!(strip_template_arguments("IntrusiveHashTable<T>"), "IntrusiveHashTable");
        assert_eq!(strip_template_arguments("ns::Table<Key<int>>::Node"), "ns::Table::Node");
        assert_eq!(strip_template_arguments("Plain"), "Plain");
    }

    #[test]
    fn test_split_scopes_respects_templates() {
        assert_eq!(split_scopes("a::Map<b::C, d::E>::Node"), vec!["a", "Map<b::C, d::E>", "Node"]);
        assert_eq!(last_segment("a::b::Leaf"), "Leaf");
        assert_eq!(last_segment("Leaf"), "Leaf");
    }

    #[test]
    fn test_qualify_and_scopes() {
        assert_eq!(qualify("", "Foo"), "Foo");
        assert_eq!(qualify("a::b", "Foo"), "a::b::Foo");
        assert_eq!(qualify("a", "::Foo"), "a::Foo");
        assert_eq!(enclosing_scopes("a::b::c"), vec!["a::b::c", "a::b", "a"]);
        assert!(enclosing_scopes("").is_empty());
    }
}
