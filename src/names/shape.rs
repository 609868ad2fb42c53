// Fri Oct 16 2026 - Alex

use crate::names::normalize::{canonicalize, collapse_whitespace, strip_template_arguments};
use crate::names::primitive::{is_primitive_name, PrimitiveType};
use once_cell::sync::Lazy;
use regex::Regex;

static FUNCTION_POINTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*(?:__\w+\s*)*\*+\s*[\w:]*\s*\)\s*\(.*\)\s*$").unwrap());

const LEADING_QUALIFIERS: &[&str] = &["const", "volatile", "typename"];
const ELABORATED_KEYWORDS: &[&str] = &["struct", "class", "union", "enum"];
const TRAILING_QUALIFIERS: &[&str] = &["const", "volatile", "__ptr32", "__ptr64", "__unaligned", "__restrict"];

/// Decomposition of a raw declaration type string into its base name and
/// the modifiers that matter for layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeShape {
    /// Modifiers stripped, internal spacing as written
    pub base_name: String,
    pub pointer_depth: u8,
    pub is_reference: bool,
    pub is_const: bool,
    pub array_dimensions: Vec<u32>,
    pub is_function_pointer: bool,
    pub elaborated_keyword: Option<&'static str>,
    original: String,
}

impl TypeShape {
    pub fn parse(type_string: &str) -> Self {
        let original = type_string.to_string();
        let mut rest = type_string.trim();

        if FUNCTION_POINTER.is_match(rest) {
            return Self {
                base_name: rest.to_string(),
                pointer_depth: 1,
                is_function_pointer: true,
                original,
                ..Self::default()
            };
        }

        let mut shape = Self {
            original,
            ..Self::default()
        };

        while rest.ends_with(']') {
            let Some(open) = rest.rfind('[') else { break };
            let dimension = parse_dimension(&rest[open + 1..rest.len() - 1]);
            shape.array_dimensions.insert(0, dimension);
            rest = rest[..open].trim_end();
        }

        loop {
            if let Some(stripped) = rest.strip_suffix("&&").or_else(|| rest.strip_suffix('&')) {
                shape.is_reference = true;
                rest = stripped.trim_end();
            } else if let Some(stripped) = rest.strip_suffix('*') {
                shape.pointer_depth = shape.pointer_depth.saturating_add(1);
                rest = stripped.trim_end();
            } else if let Some((stripped, qualifier)) = strip_trailing_word(rest, TRAILING_QUALIFIERS) {
                if qualifier == "const" {
                    shape.is_const = true;
                }
                rest = stripped;
            } else {
                break;
            }
        }

        loop {
            if let Some((stripped, qualifier)) = strip_leading_word(rest, LEADING_QUALIFIERS) {
                if qualifier == "const" {
                    shape.is_const = true;
                }
                rest = stripped;
            } else if let Some((stripped, keyword)) = strip_leading_word(rest, ELABORATED_KEYWORDS) {
                shape.elaborated_keyword = Some(keyword);
                rest = stripped;
            } else {
                break;
            }
        }

        shape.base_name = rest.trim().to_string();
        shape
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }

    pub fn is_array(&self) -> bool {
        !self.array_dimensions.is_empty()
    }

    /// Total element count across all dimensions
    pub fn array_count(&self) -> Option<u32> {
        if self.array_dimensions.is_empty() {
            return None;
        }
        Some(self.array_dimensions.iter().fold(1u32, |acc, d| acc.saturating_mul(*d)))
    }

    /// Canonical spelling of the whole type string
    pub fn canonical_string(&self) -> String {
        canonicalize(&self.original)
    }

    /// Canonical spelling of the base name, templates kept
    pub fn canonical_base(&self) -> String {
        canonicalize(&self.base_name)
    }

    /// Base name with template arguments removed
    pub fn bare_name(&self) -> String {
        strip_template_arguments(&self.canonical_base())
    }

    /// Primitive leaf named by the base, if any
    pub fn primitive(&self) -> Option<PrimitiveType> {
        if self.is_function_pointer {
            return None;
        }
        PrimitiveType::from_name(&collapse_whitespace(&self.base_name))
    }

    /// True for primitives, primitive combinations and function pointers,
    /// none of which ever get a graph node
    pub fn is_primitive_leaf(&self) -> bool {
        self.is_function_pointer || is_primitive_name(&collapse_whitespace(&self.base_name))
    }
}

fn parse_dimension(text: &str) -> u32 {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u32::from_str_radix(hex.trim_end_matches(|c: char| c == 'u' || c == 'U'), 16).unwrap_or(0);
    }
    text.trim_end_matches(|c: char| c == 'u' || c == 'U').parse().unwrap_or(0)
}

fn strip_trailing_word<'a>(s: &'a str, words: &[&'static str]) -> Option<(&'a str, &'static str)> {
    for &word in words {
        if let Some(stripped) = s.strip_suffix(word) {
            let boundary = stripped
                .chars()
                .last()
                .map(|c| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(false);
            if boundary {
                return Some((stripped.trim_end(), word));
            }
        }
    }
    None
}

fn strip_leading_word<'a>(s: &'a str, words: &[&'static str]) -> Option<(&'a str, &'static str)> {
    for &word in words {
        if let Some(stripped) = s.strip_prefix(word) {
            if stripped.starts_with(char::is_whitespace) {
                return Some((stripped.trim_start(), word));
            }
        }
    }
    None
}
