//! Schema Resolver: named references, enumeration detection and identifier sanitizing.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use super::utils::{is_reserved_word, is_type_keyword};
use crate::error::ResolveError;
use crate::spec::{SchemaKind, SchemaNode};

/// Read-only view over the document's schema library.
///
/// Every library entry gets a distinct declared identifier, assigned once in
/// document order: the first entry claims the sanitized name and later entries
/// that sanitize to the same text get a numeric suffix (`User_Profile2`).
#[derive(Debug, Clone)]
pub struct SchemaResolver<'a> {
    schemas: &'a IndexMap<String, SchemaNode>,
    names: HashMap<&'a str, String>,
}

impl<'a> SchemaResolver<'a> {
    /// Index `schemas` and assign their declared identifiers.
    pub fn new(schemas: &'a IndexMap<String, SchemaNode>) -> Self {
        let mut names = HashMap::with_capacity(schemas.len());
        let mut taken = HashSet::with_capacity(schemas.len());
        for raw in schemas.keys() {
            let base = sanitize_type_name(raw);
            let mut candidate = base.clone();
            let mut suffix = 2;
            while taken.contains(&candidate) {
                candidate = format!("{base}{suffix}");
                suffix += 1;
            }
            taken.insert(candidate.clone());
            names.insert(raw.as_str(), candidate);
        }
        Self { schemas, names }
    }

    /// The schema library in declaration order.
    pub fn schemas(&self) -> &'a IndexMap<String, SchemaNode> {
        self.schemas
    }

    /// Follow `Reference` nodes until a concrete definition is reached.
    ///
    /// Non-reference nodes are returned unchanged.
    pub fn resolve(&self, schema: &'a SchemaNode) -> Result<&'a SchemaNode, ResolveError> {
        match &schema.kind {
            SchemaKind::Reference(name) => self.resolve_name(name),
            _ => Ok(schema),
        }
    }

    /// Resolve a library entry by name, following alias chains.
    pub fn resolve_name(&self, name: &str) -> Result<&'a SchemaNode, ResolveError> {
        let mut chain = vec![name.to_string()];
        let mut current = name;
        loop {
            let node = self
                .schemas
                .get(current)
                .ok_or_else(|| ResolveError::Unresolved {
                    name: current.to_string(),
                })?;
            let SchemaKind::Reference(next) = &node.kind else {
                return Ok(node);
            };
            if chain.iter().any(|seen| seen == next) {
                chain.push(next.clone());
                return Err(ResolveError::Circular { chain });
            }
            chain.push(next.clone());
            current = next;
        }
    }

    /// True iff the resolved schema carries a literal-value set.
    ///
    /// Unresolvable schemas are not enumerations.
    pub fn is_enumeration(&self, schema: &SchemaNode) -> bool {
        match &schema.kind {
            SchemaKind::Reference(name) => self
                .resolve_name(name)
                .is_ok_and(|resolved| resolved.enum_values().is_some()),
            _ => schema.enum_values().is_some(),
        }
    }

    /// Declared identifier for a library entry.
    ///
    /// Names outside the library are sanitized without a uniqueness suffix.
    pub fn type_name(&self, name: &str) -> String {
        self.names
            .get(name)
            .cloned()
            .unwrap_or_else(|| sanitize_type_name(name))
    }
}

/// Map an arbitrary name to an identifier valid in TypeScript.
///
/// - Characters outside `[A-Za-z0-9_$]` become `_`
/// - A leading digit gets a `_` prefix
/// - Reserved words get a `_` prefix
pub fn sanitize_identifier(raw: &str) -> String {
    let mut result: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if result.is_empty() {
        return "_".to_string();
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }

    if is_reserved_word(&result) {
        result.insert(0, '_');
    }

    result
}

/// Like [`sanitize_identifier`], also avoiding built-in type names.
pub fn sanitize_type_name(raw: &str) -> String {
    let name = sanitize_identifier(raw);
    if is_type_keyword(&name) {
        format!("_{name}")
    } else {
        name
    }
}
