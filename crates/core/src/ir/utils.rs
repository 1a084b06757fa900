//! Common utilities for TypeScript code generation.
//!
//! This module provides shared helper functions used across analysis and emission.

use regex::Regex;

use super::types::TsLiteral;
use crate::spec::EnumValue;

/// Words that cannot name a binding in generated code.
pub fn is_reserved_word(name: &str) -> bool {
    matches!(
        name,
        "await" | "async" | "break" | "case" | "catch" | "class" | "const" | "continue"
            | "debugger" | "default" | "delete" | "do" | "else" | "enum" | "export"
            | "extends" | "false" | "finally" | "for" | "function" | "if" | "implements"
            | "import" | "in" | "instanceof" | "interface" | "let" | "new" | "null"
            | "package" | "private" | "protected" | "public" | "return" | "static"
            | "super" | "switch" | "this" | "throw" | "true" | "try" | "typeof" | "var"
            | "void" | "while" | "with" | "yield"
    )
}

/// Built-in type names a declaration must not shadow.
pub fn is_type_keyword(name: &str) -> bool {
    matches!(
        name,
        "any" | "bigint" | "boolean" | "never" | "number" | "object" | "string" | "symbol"
            | "undefined" | "unknown"
    )
}

/// `[A-Za-z_$][A-Za-z0-9_$]*`
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '_' | '$'))
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$'))
}

/// Property keys that are not plain identifiers must be accessed as `obj["key"]`.
pub fn needs_bracket_notation(name: &str) -> bool {
    !is_plain_identifier(name)
}

/// Body of a double-quoted string literal.
pub fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Object key as written in a literal or type: bare when possible, quoted otherwise.
pub fn quote_if_needed(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", escape_js_string(name))
    }
}

/// Split on anything that is not an ASCII letter or digit.
fn split_words(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Lowercase the first character; all-caps words (`GET`, `ID`) are lowered whole.
fn lower_first(s: &str) -> String {
    if !s.chars().any(|c| c.is_ascii_lowercase()) {
        return s.to_ascii_lowercase();
    }
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_lowercase().chain(chars).collect())
        .unwrap_or_default()
}

/// camelCase projection: `list_users` -> `listUsers`, `ListUsers` -> `listUsers`.
///
/// Inner casing of each word is preserved.
pub fn camel_case(raw: &str) -> String {
    let mut out = String::new();
    for (i, word) in split_words(raw).enumerate() {
        if i == 0 {
            out.push_str(&lower_first(word));
        } else {
            out.push_str(&capitalize_first(word));
        }
    }
    out
}

/// PascalCase projection: `user-accounts` -> `UserAccounts`.
pub fn pascal_case(raw: &str) -> String {
    split_words(raw).map(capitalize_first).collect()
}

/// Remove every case-insensitive occurrence of `tag` from `name`.
///
/// Falls back to `name` when nothing would be left.
pub fn strip_tag(name: &str, tag: &str) -> String {
    if tag.is_empty() {
        return name.to_string();
    }
    let Ok(pattern) = Regex::new(&format!("(?i){}", regex::escape(tag))) else {
        return name.to_string();
    };
    let stripped = pattern.replace_all(name, "");
    if stripped.is_empty() {
        name.to_string()
    } else {
        stripped.into_owned()
    }
}

/// Literal type for one member of an `enum` list.
pub fn enum_value_to_literal(value: &EnumValue) -> TsLiteral {
    match *value {
        EnumValue::String(ref text) => TsLiteral::String(text.clone()),
        EnumValue::Integer(int) => TsLiteral::Int(int),
        EnumValue::Float(float) => TsLiteral::Number(float),
        EnumValue::Bool(flag) => TsLiteral::Bool(flag),
        EnumValue::Null => TsLiteral::Null,
    }
}

/// Key of an enumeration member inside the `as const` object.
///
/// Strings key themselves; other values get a synthetic upper-case key.
pub fn enum_value_to_key(value: &EnumValue, position: usize) -> String {
    match *value {
        EnumValue::String(ref text) => quote_if_needed(text),
        EnumValue::Integer(int) if int < 0 => format!("VALUE_MINUS_{}", int.unsigned_abs()),
        EnumValue::Integer(int) => format!("VALUE_{int}"),
        EnumValue::Float(_) => format!("VALUE_{position}"),
        EnumValue::Bool(true) => "TRUE".to_string(),
        EnumValue::Bool(false) => "FALSE".to_string(),
        EnumValue::Null => "NULL".to_string(),
    }
}
