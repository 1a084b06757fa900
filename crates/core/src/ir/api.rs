//! API-level IR for analyzed operations.
//!
//! This module defines the records the operation analyzer produces:
//! - AnalyzedOperation: one per (path, method, tag)
//! - ParamIR / BodyIR / ResponseIR: the extracted facts, already mapped to types
//! - PathTemplate: a parsed `/users/{id}` style template

use super::types::{ReferencedTypes, TypeNode};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Uppercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase name as it appears in a path item.
    pub fn key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    /// POST, PUT and PATCH carry a request body.
    pub fn is_state_mutating(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// `{name}` placeholder in the path template
    Path,
    /// Query string
    Query,
    /// Request header
    Header,
}

/// Single parameter definition
#[derive(Debug, Clone, PartialEq)]
pub struct ParamIR {
    /// Name as declared in the document (also the field name in `params`)
    pub name: String,
    /// Where the value travels
    pub location: ParamLocation,
    /// Declared required; always true for path parameters
    pub required: bool,
    /// Parameter type under the input view
    pub ty: TypeNode,
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyIR {
    /// Chosen media type (JSON preferred)
    pub media_type: String,
    /// `requestBody.required`
    pub required: bool,
    /// Body type under the input view
    pub ty: TypeNode,
}

/// How a response payload is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// A JSON media type is declared
    Json,
    /// First media type is `text/*`
    Text,
    /// Anything else: binary, XML, form data
    Opaque,
    /// No content at all
    Void,
}

impl ResponseKind {
    /// Value of the `responseType` field passed to the transport.
    pub fn response_type(&self) -> &'static str {
        match self {
            ResponseKind::Json => "json",
            ResponseKind::Text => "text",
            ResponseKind::Opaque => "raw",
            ResponseKind::Void => "void",
        }
    }
}

/// Chosen success response
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseIR {
    /// Status key of the first declared response entry
    pub status: String,
    /// Payload classification
    pub kind: ResponseKind,
    /// Result type under the output view
    pub ty: TypeNode,
}

/// One operation, analyzed for one of its tags
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedOperation {
    /// HTTP method
    pub method: HttpMethod,
    /// Path template (e.g., "/users/{id}")
    pub path: String,
    /// Declared operationId, or one synthesized from the path tail and method
    pub operation_id: String,
    /// Sanitized camelCase projection of the operation id
    pub method_name: String,
    /// Sanitized PascalCase projection of the tag
    pub tag: String,
    /// Tag as declared ("default" when the operation declares none)
    pub raw_tag: String,
    /// Operation summary, rendered as JSDoc
    pub summary: Option<String>,
    /// Path parameters, declared and implicit
    pub path_params: Vec<ParamIR>,
    /// Header parameters
    pub header_params: Vec<ParamIR>,
    /// Query parameters
    pub query_params: Vec<ParamIR>,
    /// Only ever set for state-mutating methods
    pub body: Option<BodyIR>,
    /// First declared response entry
    pub response: ResponseIR,
    /// Named types touched by parameters, body and response
    pub referenced: ReferencedTypes,
}

impl AnalyzedOperation {
    /// Location string used in diagnostics: `GET /users/{id}`.
    pub fn location(&self) -> String {
        format!("{} {}", self.method.as_str(), self.path)
    }

    /// Path, header and query parameters in that order.
    pub fn all_params(&self) -> impl Iterator<Item = &ParamIR> {
        self.path_params
            .iter()
            .chain(&self.header_params)
            .chain(&self.query_params)
    }
}

/// Part of a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPart {
    /// Literal text
    Static(String),
    /// `{name}` placeholder
    Param(String),
}

/// Parsed path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    /// Literal and placeholder parts in template order
    pub parts: Vec<PathPart>,
}

impl PathTemplate {
    /// Split a template into literal text and `{name}` placeholders.
    ///
    /// An unterminated `{` is kept as literal text.
    pub fn parse(template: &str) -> Self {
        let mut parts = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            if start > 0 {
                parts.push(PathPart::Static(rest[..start].to_string()));
            }
            parts.push(PathPart::Param(rest[start + 1..start + len].to_string()));
            rest = &rest[start + len + 1..];
        }
        if !rest.is_empty() {
            parts.push(PathPart::Static(rest.to_string()));
        }

        Self { parts }
    }

    /// Placeholder names in template order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            PathPart::Param(name) => Some(name.as_str()),
            PathPart::Static(_) => None,
        })
    }

    /// Render the template, substituting placeholders via `lookup`.
    ///
    /// Placeholders the lookup does not know are left as `{name}`.
    pub fn expand(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                PathPart::Static(text) => text.clone(),
                PathPart::Param(name) => lookup(name).unwrap_or_else(|| format!("{{{name}}}")),
            })
            .collect()
    }
}
