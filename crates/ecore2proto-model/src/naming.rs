//! Naming rules shared by the annotation collector and the proto generator.
//!
//! - message / enum names: first character uppercased
//! - field names and file stems: `lower_snake_case`
//! - enum values: `ENUM_PREFIX_VALUE`
//! - annotation option fields: `lower_snake_case`, optionally source-prefixed

use regex::Regex;
use std::sync::OnceLock;

/// Prefix for field names that would otherwise start with a digit.
pub const DIGIT_GUARD_PREFIX: &str = "field_";

/// Name used when normalization leaves nothing behind.
pub const EMPTY_NAME_FALLBACK: &str = "unknown";

/// Shortened source used for empty annotation sources.
pub const UNKNOWN_SOURCE: &str = "unknown";

fn lower_upper_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("static regex"))
}

fn acronym_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("static regex"))
}

fn underscore_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").expect("static regex"))
}

fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_]").expect("static regex"))
}

fn non_lower_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_]").expect("static regex"))
}

fn non_upper_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Z0-9_]").expect("static regex"))
}

/// Insert `_` at camelCase (`employeeCount`) and acronym (`XMLParser`) boundaries.
pub fn split_camel_boundaries(name: &str) -> String {
    let s = lower_upper_boundary().replace_all(name, "${1}_${2}");
    acronym_boundary().replace_all(&s, "${1}_${2}").into_owned()
}

fn is_all_upper(name: &str) -> bool {
    name.to_uppercase() == name
}

fn collapse_underscores(s: &str) -> String {
    underscore_runs()
        .replace_all(s, "_")
        .trim_matches('_')
        .to_string()
}

/// Message / enum name: first character uppercased, the rest untouched.
pub fn to_message_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Unknown".to_string(),
    }
}

/// `lower_snake_case` field name.
///
/// Names that are already `UPPER_CASE` or contain `_` are only lowercased;
/// camel-case names get boundary underscores first.
pub fn to_field_name(name: &str) -> String {
    let s = if is_all_upper(name) || name.contains('_') {
        name.to_lowercase()
    } else {
        split_camel_boundaries(name).to_lowercase()
    };
    let s = non_lower_word().replace_all(&s, "_");
    let s = collapse_underscores(&s);

    if s.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("{DIGIT_GUARD_PREFIX}{s}");
    }
    if s.is_empty() {
        return EMPTY_NAME_FALLBACK.to_string();
    }
    s
}

/// `UPPER_SNAKE_CASE`, used for enum value names.
pub fn to_upper_snake(name: &str) -> String {
    if is_all_upper(name) {
        return non_upper_word()
            .replace_all(name, "_")
            .trim_matches('_')
            .to_string();
    }
    let s = split_camel_boundaries(name);
    let s = non_word().replace_all(&s, "_");
    s.to_uppercase().trim_matches('_').to_string()
}

/// `<ENUM>_<LITERAL>`, unless the literal already carries the enum prefix.
pub fn enum_value_name(enum_name: &str, literal_name: &str) -> String {
    let prefix = to_upper_snake(enum_name);
    let value = to_upper_snake(literal_name);
    if value.starts_with(&prefix) {
        value
    } else {
        format!("{prefix}_{value}")
    }
}

/// Short, identifier-safe token for an annotation source URI.
///
/// `http://www.eclipse.org/emf/2002/GenModel` → `genmodel`,
/// `http://example.com/ui/` → `ui`.
pub fn shorten_source(source: &str) -> String {
    let cleaned = source.trim_end_matches('/');
    let last = cleaned.rsplit('/').next().unwrap_or(cleaned);
    let last = non_word().replace_all(last, "_").to_lowercase();
    let last = collapse_underscores(&last);
    if last.is_empty() {
        UNKNOWN_SOURCE.to_string()
    } else {
        last
    }
}

/// Extension field name for an annotation key; `source_short` is only passed
/// when the key collides across sources.
pub fn to_option_field_name(source_short: Option<&str>, key: &str) -> String {
    let raw = match source_short {
        Some(source) if !source.is_empty() => format!("{source}_{key}"),
        _ => key.to_string(),
    };
    let s = split_camel_boundaries(&raw).to_lowercase();
    let s = non_lower_word().replace_all(&s, "_");
    collapse_underscores(&s)
}

/// Proto package for an Ecore package name, optionally prefixed.
pub fn to_proto_package(name: &str, prefix: &str) -> String {
    let pkg = name.to_lowercase().replace(['-', '.'], "_");
    if prefix.is_empty() {
        pkg
    } else {
        format!("{prefix}.{pkg}")
    }
}
