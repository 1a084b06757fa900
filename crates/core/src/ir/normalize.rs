//! Operation Analyzer: path items to [`AnalyzedOperation`] records.
//!
//! This module handles all the OpenAPI-specific operation logic:
//! - Operation id synthesis and method/tag naming
//! - Parameter merging (path level, operation level, component refs)
//! - Request body and success response selection
//! - Referenced-type harvesting through the type mapper

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::api::{
    AnalyzedOperation, BodyIR, HttpMethod, ParamIR, ParamLocation, PathTemplate, ResponseIR,
    ResponseKind,
};
use super::mapper::{MapContext, Mapped, ViewFilter, map_schema};
use super::resolve::{SchemaResolver, sanitize_identifier};
use super::types::{PrimitiveType, ReferencedTypes, TypeNode};
use super::utils::{camel_case, pascal_case};
use crate::config::GeneratorConfig;
use crate::error::{AnalyzeError, Diagnostic};
use crate::spec::{
    Components, MediaType, OpenApiSpec, Operation, Parameter, ParameterLocation, PathItem,
    ReferenceOr, RequestBody, Response,
};

/// Tag assigned to operations that declare none.
pub const DEFAULT_TAG: &str = "default";

/// Every analyzed operation of a document plus what went wrong on the way.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// One record per (operation, tag) pair, in document order
    pub operations: Vec<AnalyzedOperation>,
    /// Skipped operations and degraded shapes
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    /// Union of the referenced types of every operation.
    pub fn referenced(&self) -> ReferencedTypes {
        let mut refs = ReferencedTypes::default();
        for op in &self.operations {
            refs.merge(op.referenced.clone());
        }
        refs
    }
}

/// Analyze every operation of every path, in document order.
///
/// Malformed operations are skipped and reported; the rest are analyzed.
pub fn analyze_spec(
    spec: &OpenApiSpec,
    resolver: &SchemaResolver<'_>,
    config: &GeneratorConfig,
) -> Analysis {
    let prefix = config.type_prefix();
    let ctx = MapContext {
        prefix: prefix.as_deref(),
        ..MapContext::new(resolver)
    };
    let views = Views::from_config(config);
    let mut analysis = Analysis::default();

    for (path, item) in &spec.paths {
        for (method, op) in item.operations() {
            let location = format!("{} {path}", method.as_str());
            match analyze_operation(&spec.components, &ctx, views, path, method, item, op) {
                Ok((records, notes)) => {
                    debug!(
                        %location,
                        tags = records.len(),
                        refs = records.first().map_or(0, |r| r.referenced.iter().count()),
                        "analyzed operation"
                    );
                    analysis.diagnostics.extend(notes);
                    analysis.operations.extend(records);
                }
                Err(err) => {
                    warn!(%location, error = %err, "skipping operation");
                    analysis
                        .diagnostics
                        .push(Diagnostic::error(location, format!("operation skipped: {err}")));
                }
            }
        }
    }

    analysis
}

/// Views applied to parameters, bodies and responses.
#[derive(Debug, Clone, Copy)]
struct Views {
    params: ViewFilter,
    body: ViewFilter,
    response: ViewFilter,
}

impl Views {
    fn from_config(config: &GeneratorConfig) -> Self {
        if config.add_readonly_writeonly_modifiers {
            Self {
                params: ViewFilter::Input,
                body: ViewFilter::Input,
                response: ViewFilter::Output,
            }
        } else {
            Self {
                params: ViewFilter::None,
                body: ViewFilter::None,
                response: ViewFilter::None,
            }
        }
    }
}

/// Collects referenced types and notes across the mappings of one operation.
#[derive(Debug, Default)]
struct Harvest {
    refs: ReferencedTypes,
    notes: Vec<Diagnostic>,
}

impl Harvest {
    fn take(&mut self, mapped: Mapped) -> TypeNode {
        self.refs.merge(mapped.refs);
        self.notes.extend(mapped.notes);
        mapped.ty
    }
}

/// Analyze one operation; returns one record per tag.
fn analyze_operation(
    components: &Components,
    ctx: &MapContext<'_, '_>,
    views: Views,
    path: &str,
    method: HttpMethod,
    item: &PathItem,
    op: &Operation,
) -> Result<(Vec<AnalyzedOperation>, Vec<Diagnostic>), AnalyzeError> {
    let pointer = format!("#/paths/{}/{}", escape_pointer(path), method.key());
    let operation_id = op
        .operation_id
        .clone()
        .unwrap_or_else(|| synthesize_operation_id(path, method));
    let method_name = method_name(&operation_id);
    let mut harvest = Harvest::default();
    let param_ctx = ctx.with_view(views.params);

    // Parameters
    let mut path_params = Vec::new();
    let mut header_params = Vec::new();
    let mut query_params = Vec::new();
    for param in merge_parameters(components, &item.parameters, &op.parameters)? {
        let (location, bucket) = match param.location {
            ParameterLocation::Path => (ParamLocation::Path, &mut path_params),
            ParameterLocation::Header => (ParamLocation::Header, &mut header_params),
            ParameterLocation::Query => (ParamLocation::Query, &mut query_params),
            ParameterLocation::Cookie | ParameterLocation::Other => continue,
        };
        let ty = match &param.schema {
            Some(schema) => {
                let param_pointer = format!("{pointer}/parameters/{}", param.name);
                harvest.take(map_schema(schema, &param_ctx, &param_pointer)?)
            }
            None => TypeNode::primitive(PrimitiveType::String),
        };
        bucket.push(ParamIR {
            name: param.name.clone(),
            location,
            required: param.required || location == ParamLocation::Path,
            ty,
        });
    }

    for placeholder in PathTemplate::parse(path).params() {
        if !path_params.iter().any(|p: &ParamIR| p.name == placeholder) {
            debug!(path, placeholder, "adding undeclared path parameter");
            path_params.push(ParamIR {
                name: placeholder.to_string(),
                location: ParamLocation::Path,
                required: true,
                ty: TypeNode::primitive(PrimitiveType::String),
            });
        }
    }

    // Request body
    let body = match &op.request_body {
        Some(body) if method.is_state_mutating() => {
            let body = resolve_component(&components.request_bodies, body, "requestBodies")?;
            let body_ctx = ctx.with_view(views.body);
            analyze_body(body, &body_ctx, &pointer, &mut harvest)?
        }
        Some(_) => {
            debug!(path, method = method.as_str(), "ignoring request body");
            None
        }
        None => None,
    };

    // Success response: the first declared entry, whatever its status
    let (status, response) = op
        .responses
        .first()
        .ok_or_else(|| AnalyzeError::Malformed {
            reason: "no response entries".to_string(),
        })?;
    let response = resolve_component(&components.responses, response, "responses")?;
    let response_ctx = ctx.with_view(views.response);
    let response = analyze_response(status, response, &response_ctx, &pointer, &mut harvest)?;

    let mut tags: Vec<(String, &str)> = Vec::new();
    let raw_tags: Vec<&str> = if op.tags.is_empty() {
        vec![DEFAULT_TAG]
    } else {
        op.tags.iter().map(String::as_str).collect()
    };
    for raw in raw_tags {
        let tag = tag_name(raw);
        if !tags.iter().any(|(seen, _)| *seen == tag) {
            tags.push((tag, raw));
        }
    }

    let records = tags
        .into_iter()
        .map(|(tag, raw_tag)| AnalyzedOperation {
            method,
            path: path.to_string(),
            operation_id: operation_id.clone(),
            method_name: method_name.clone(),
            tag,
            raw_tag: raw_tag.to_string(),
            summary: op.summary.clone(),
            path_params: path_params.clone(),
            header_params: header_params.clone(),
            query_params: query_params.clone(),
            body: body.clone(),
            response: response.clone(),
            referenced: harvest.refs.clone(),
        })
        .collect();

    Ok((records, harvest.notes))
}

fn analyze_body(
    body: &RequestBody,
    ctx: &MapContext<'_, '_>,
    pointer: &str,
    harvest: &mut Harvest,
) -> Result<Option<BodyIR>, AnalyzeError> {
    let Some((media_type, media)) = preferred_media(&body.content) else {
        return Ok(None);
    };
    let ty = match &media.schema {
        Some(schema) => {
            let body_pointer = format!("{pointer}/requestBody/content/{}", escape_pointer(media_type));
            harvest.take(map_schema(schema, ctx, &body_pointer)?)
        }
        None => TypeNode::primitive(PrimitiveType::Unknown),
    };
    Ok(Some(BodyIR {
        media_type: media_type.clone(),
        required: body.required,
        ty,
    }))
}

fn analyze_response(
    status: &str,
    response: &Response,
    ctx: &MapContext<'_, '_>,
    pointer: &str,
    harvest: &mut Harvest,
) -> Result<ResponseIR, AnalyzeError> {
    let Some((media_type, media)) = preferred_media(&response.content) else {
        return Ok(ResponseIR {
            status: status.to_string(),
            kind: ResponseKind::Void,
            ty: TypeNode::primitive(PrimitiveType::Void),
        });
    };

    let (kind, ty) = if is_json(media_type) {
        let ty = match &media.schema {
            Some(schema) => {
                let response_pointer = format!(
                    "{pointer}/responses/{status}/content/{}",
                    escape_pointer(media_type)
                );
                harvest.take(map_schema(schema, ctx, &response_pointer)?)
            }
            None => TypeNode::primitive(PrimitiveType::Unknown),
        };
        (ResponseKind::Json, ty)
    } else if media_type.starts_with("text/") {
        (ResponseKind::Text, TypeNode::primitive(PrimitiveType::String))
    } else {
        (ResponseKind::Opaque, TypeNode::primitive(PrimitiveType::Unknown))
    };

    Ok(ResponseIR {
        status: status.to_string(),
        kind,
        ty,
    })
}

/// A JSON media type if one is declared, else the first one.
fn preferred_media(content: &IndexMap<String, MediaType>) -> Option<(&String, &MediaType)> {
    content
        .iter()
        .find(|(media_type, _)| is_json(media_type))
        .or_else(|| content.first())
}

fn is_json(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Path-level parameters overridden by operation-level ones with the same
/// name and location.
fn merge_parameters<'s>(
    components: &'s Components,
    path_level: &'s [ReferenceOr<Parameter>],
    op_level: &'s [ReferenceOr<Parameter>],
) -> Result<Vec<&'s Parameter>, AnalyzeError> {
    let mut merged: Vec<&Parameter> = Vec::new();
    for param in path_level {
        merged.push(resolve_component(&components.parameters, param, "parameters")?);
    }
    for param in op_level {
        let param = resolve_component(&components.parameters, param, "parameters")?;
        match merged
            .iter_mut()
            .find(|m| m.name == param.name && m.location == param.location)
        {
            Some(slot) => *slot = param,
            None => merged.push(param),
        }
    }
    Ok(merged)
}

/// Follow `$ref`s into one `components` section.
fn resolve_component<'s, T>(
    section: &'s IndexMap<String, ReferenceOr<T>>,
    item: &'s ReferenceOr<T>,
    section_name: &str,
) -> Result<&'s T, AnalyzeError> {
    let prefix = format!("#/components/{section_name}/");
    let mut current = item;
    for _ in 0..=section.len() {
        match current {
            ReferenceOr::Item(value) => return Ok(value),
            ReferenceOr::Reference { reference } => {
                current = reference
                    .strip_prefix(&prefix)
                    .map(|name| name.replace("~1", "/").replace("~0", "~"))
                    .and_then(|name| section.get(&name))
                    .ok_or_else(|| AnalyzeError::Malformed {
                        reason: format!("unresolved reference '{reference}'"),
                    })?;
            }
        }
    }
    Err(AnalyzeError::Malformed {
        reason: format!("circular reference in components.{section_name}"),
    })
}

/// Operation id for an operation that declares none: final path segment plus
/// method, e.g. `/users/{id}` + GET -> `idGet`.
///
/// Two paths sharing a final segment produce the same id.
pub fn synthesize_operation_id(path: &str, method: HttpMethod) -> String {
    let segment = path
        .split('/')
        .rfind(|s| !s.is_empty())
        .map_or("root", |s| s.trim_start_matches('{').trim_end_matches('}'));
    camel_case(&format!("{segment} {}", method.key()))
}

/// camelCase identifier derived from an operation id.
pub fn method_name(operation_id: &str) -> String {
    sanitize_identifier(&camel_case(operation_id))
}

/// PascalCase identifier derived from a tag.
pub fn tag_name(raw: &str) -> String {
    sanitize_identifier(&pascal_case(raw))
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
