//! Error taxonomy and diagnostics for a generation run.
//!
//! Reference and operation failures are local: they skip the affected
//! declaration and surface as a [`Diagnostic`]. A [`GenerateError`] fails the
//! client artifact or, for an unreadable document, the whole run.

use std::fmt;

use thiserror::Error;

/// Failure to follow a named schema reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The target name is absent from the schema library.
    #[error("unresolved reference to schema '{name}'")]
    Unresolved {
        /// Missing library name
        name: String,
    },
    /// The reference chain loops without reaching a concrete definition.
    #[error("circular reference chain {}", .chain.join(" -> "))]
    Circular {
        /// Names visited, ending with the repeated one
        chain: Vec<String>,
    },
}

/// Failure to analyze a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    /// The operation has no usable response entry or a dangling component reference.
    #[error("malformed operation: {reason}")]
    Malformed {
        /// What is missing or dangling
        reason: String,
    },
    /// A schema used by the operation references a missing or looping definition.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Failure that aborts a whole artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The document could not be parsed.
    #[error("{0}")]
    Document(String),
    /// Two operations collapse to the same exposed name.
    #[error(
        "Duplicate method name '{name}' in tag '{tag}': '{first}' and '{second}' collide"
    )]
    DuplicateMethodName {
        /// Tag grouping holding both operations
        tag: String,
        /// Colliding exposed name or callable identifier
        name: String,
        /// Operation id that claimed the name first
        first: String,
        /// Operation id that collided
        second: String,
    },
}

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Output was produced with a degraded type.
    Warning,
    /// A declaration or operation was skipped.
    Error,
}

/// A located message produced while generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Warning or error
    pub severity: Severity,
    /// Document location, e.g. `#/components/schemas/User` or `GET /users/{id}`.
    pub location: String,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// A degraded but emitted declaration.
    pub fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }

    /// A skipped declaration or operation.
    pub fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {}: {}", self.location, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_message_lists_chain() {
        let err = ResolveError::Circular {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "circular reference chain A -> B -> A");
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::error("GET /users", "no responses");
        assert_eq!(d.to_string(), "error: GET /users: no responses");
    }
}
