//! Client Synthesizer: type library and client declarations.
//!
//! This module turns the schema library and the analyzed operations into the
//! two ordered declaration lists handed to a writer:
//! - the type library (aliases, enumerations, DateTime, view projections)
//! - the client (imports, `pick` helper, callables, tag groupings)

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::api::{AnalyzedOperation, PathPart, PathTemplate};
use super::mapper::{
    DATE_TIME, INPUT_VIEW, MapContext, OUTPUT_VIEW, READ_ONLY, WRITE_ONLY, map_schema,
};
use super::resolve::{SchemaResolver, sanitize_identifier};
use super::types::{
    Artifact, Declaration, Helper, ImportItems, ObjectMember, ObjectProperty, PrimitiveType,
    ReferencedTypes, TagGroup, TemplatePart, TsExpr, TsFunction, TsImport, TsLiteral, TsParam,
    TsStmt, TsTypeDef, TypeDefKind, TypeNode,
};
use super::utils::{camel_case, enum_value_to_key, enum_value_to_literal, pascal_case, strip_tag};
use crate::config::GeneratorConfig;
use crate::error::{Diagnostic, GenerateError};
use crate::spec::{OpenApiSpec, SchemaKind};

const VIEW_HELPER_NAMES: [&str; 4] = [READ_ONLY, WRITE_ONLY, INPUT_VIEW, OUTPUT_VIEW];

/// The type library artifact plus the names it declares.
#[derive(Debug, Clone, Default)]
pub struct TypeLibrary {
    /// Declarations of `types.ts`
    pub artifact: Artifact,
    /// Every type name a client may import
    pub declared: BTreeSet<String>,
    /// Skipped and degraded schemas
    pub diagnostics: Vec<Diagnostic>,
}

/// A library entry waiting for its references to be checked.
#[derive(Debug)]
struct PendingType {
    def: TsTypeDef,
    pointer: String,
    refs: ReferencedTypes,
}

/// Names the library declares on demand rather than from a schema.
fn is_generated_name(name: &str) -> bool {
    name == DATE_TIME || VIEW_HELPER_NAMES.contains(&name)
}

/// Build the type library.
///
/// `client_refs` are the names the client needs; they decide whether the
/// `DateTime` alias and the view projections are declared. A schema that
/// cannot be mapped is skipped, and so is every entry that refers to a
/// skipped one, each reported at its own pointer.
pub fn synthesize_types(
    spec: &OpenApiSpec,
    resolver: &SchemaResolver<'_>,
    config: &GeneratorConfig,
    client_refs: &ReferencedTypes,
) -> TypeLibrary {
    let ctx = MapContext {
        project: config.add_readonly_writeonly_modifiers,
        ..MapContext::new(resolver)
    };
    let mut library = TypeLibrary::default();
    let mut pending = Vec::new();

    for (name, schema) in resolver.schemas() {
        let pointer = format!("#/components/schemas/{name}");
        let (kind, refs) = match resolver.resolve(schema) {
            Ok(target) if resolver.is_enumeration(target) => {
                let values = target.enum_values().unwrap_or_default();
                let kind = TypeDefKind::ConstEnum {
                    values: values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (enum_value_to_key(v, i), enum_value_to_literal(v)))
                        .collect(),
                    nullable: schema.nullable || target.nullable,
                };
                (kind, ReferencedTypes::default())
            }
            _ => match map_schema(schema, &ctx, &pointer) {
                Ok(mapped) => {
                    library.diagnostics.extend(mapped.notes);
                    (TypeDefKind::TypeAlias { ty: mapped.ty }, mapped.refs)
                }
                Err(err) => {
                    warn!(schema = %name, error = %err, "skipping schema");
                    library
                        .diagnostics
                        .push(Diagnostic::error(pointer, format!("type skipped: {err}")));
                    continue;
                }
            },
        };

        pending.push(PendingType {
            def: TsTypeDef {
                name: resolver.type_name(name),
                kind,
            },
            pointer,
            refs,
        });
    }

    // Drop entries that name a skipped type until nothing else falls out
    loop {
        let available: BTreeSet<String> = pending.iter().map(|p| p.def.name.clone()).collect();
        let before = pending.len();
        pending.retain(|entry| {
            let missing = entry
                .refs
                .iter()
                .find(|r| !available.contains(*r) && !is_generated_name(r));
            match missing {
                Some(missing) => {
                    warn!(type_name = %entry.def.name, missing, "skipping dependent type");
                    library.diagnostics.push(Diagnostic::error(
                        entry.pointer.clone(),
                        format!("type skipped: references '{missing}' which was not generated"),
                    ));
                    false
                }
                None => true,
            }
        });
        if pending.len() == before {
            library.declared = available;
            break;
        }
    }

    let mut uses = client_refs.clone();
    for entry in &pending {
        uses.merge(entry.refs.clone());
    }
    let declarations = &mut library.artifact.declarations;

    if uses.contains(DATE_TIME) && !library.declared.contains(DATE_TIME) {
        declarations.push(Declaration::Type(TsTypeDef {
            name: DATE_TIME.to_string(),
            kind: TypeDefKind::TypeAlias {
                ty: TypeNode::primitive(PrimitiveType::String),
            },
        }));
        library.declared.insert(DATE_TIME.to_string());
    }

    let needs_views = config.add_readonly_writeonly_modifiers
        && (has_marked_properties(spec) || VIEW_HELPER_NAMES.iter().any(|n| uses.contains(n)));
    if needs_views {
        for name in VIEW_HELPER_NAMES {
            if !library.declared.insert(name.to_string()) {
                library.diagnostics.push(Diagnostic::warning(
                    format!("#/components/schemas/{name}"),
                    format!("schema '{name}' clashes with the generated view projection of the same name"),
                ));
            }
        }
        declarations.push(Declaration::Helper(Helper::ViewProjections));
    }

    declarations.extend(pending.into_iter().map(|entry| Declaration::Type(entry.def)));

    debug!(
        types = library.declared.len(),
        views = needs_views,
        "synthesized type library"
    );
    library
}

/// True if any object property in the document is read-only or write-only.
fn has_marked_properties(spec: &OpenApiSpec) -> bool {
    spec.all_schemas().iter().any(|node| match &node.kind {
        SchemaKind::Object { properties, .. } => {
            properties.values().any(|p| p.read_only || p.write_only)
        }
        _ => false,
    })
}

/// Identifier of the callable for `op`: `<tagCamel><MethodPascal>`.
pub fn callable_name(op: &AnalyzedOperation) -> String {
    sanitize_identifier(&format!(
        "{}{}",
        camel_case(&op.tag),
        pascal_case(&op.method_name)
    ))
}

/// Key under which `op` is exposed in its tag grouping.
pub fn exposed_name(op: &AnalyzedOperation, config: &GeneratorConfig) -> String {
    if config.remove_tag_from_operation_id {
        sanitize_identifier(&strip_tag(&op.method_name, &op.tag))
    } else {
        op.method_name.clone()
    }
}

/// Build the client artifact.
///
/// Operations that reference a type missing from `declared` are skipped and
/// reported. Fails when two remaining operations of one tag are exposed under
/// the same name or two callables share an identifier.
pub fn synthesize_client(
    operations: &[AnalyzedOperation],
    config: &GeneratorConfig,
    declared: &BTreeSet<String>,
) -> Result<(Artifact, Vec<Diagnostic>), GenerateError> {
    let mut diagnostics = Vec::new();
    let mut kept: Vec<&AnalyzedOperation> = Vec::with_capacity(operations.len());
    for op in operations {
        match op.referenced.iter().find(|name| !declared.contains(*name)) {
            Some(missing) => {
                warn!(location = %op.location(), missing, "skipping operation");
                diagnostics.push(Diagnostic::error(
                    op.location(),
                    format!("operation skipped: references type '{missing}' which was not generated"),
                ));
            }
            None => kept.push(op),
        }
    }

    let mut groups: IndexMap<&str, Vec<(String, String, &str)>> = IndexMap::new();
    let mut owners: HashMap<String, &str> = HashMap::new();

    for &op in &kept {
        let callable = callable_name(op);
        let key = exposed_name(op, config);
        let group = groups.entry(op.tag.as_str()).or_default();

        if let Some((_, _, first)) = group.iter().find(|(k, _, _)| *k == key) {
            return Err(GenerateError::DuplicateMethodName {
                tag: op.tag.clone(),
                name: key,
                first: (*first).to_string(),
                second: op.operation_id.clone(),
            });
        }
        if let Some(first) = owners.get(&callable) {
            return Err(GenerateError::DuplicateMethodName {
                tag: op.tag.clone(),
                name: callable,
                first: (*first).to_string(),
                second: op.operation_id.clone(),
            });
        }

        owners.insert(callable.clone(), op.operation_id.as_str());
        group.push((key, callable, op.operation_id.as_str()));
    }

    // Imports
    let mut referenced = ReferencedTypes::default();
    for op in &kept {
        referenced.merge(op.referenced.clone());
    }
    let imported: Vec<String> = referenced.iter().map(str::to_string).collect();

    let mut declarations = vec![
        Declaration::Import(TsImport {
            items: ImportItems::Named(vec!["request".to_string()]),
            from: config.transport_module.clone(),
            type_only: false,
        }),
        Declaration::Import(TsImport {
            items: ImportItems::Named(vec!["TransportOptions".to_string()]),
            from: config.transport_module.clone(),
            type_only: true,
        }),
    ];
    if !imported.is_empty() {
        let items = match &config.types_namespace {
            Some(ns) => ImportItems::Namespace(ns.clone()),
            None => ImportItems::Named(imported.clone()),
        };
        declarations.push(Declaration::Import(TsImport {
            items,
            from: config.types_module.clone(),
            type_only: true,
        }));
    }

    if kept
        .iter()
        .any(|op| !op.header_params.is_empty() || !op.query_params.is_empty())
    {
        declarations.push(Declaration::Helper(Helper::Pick));
    }

    for &op in &kept {
        declarations.push(Declaration::Callable(codegen_callable(
            op,
            config,
            &mut diagnostics,
        )));
    }

    for (tag, members) in groups {
        if config.types_namespace.is_none() && imported.iter().any(|n| n == tag) {
            diagnostics.push(Diagnostic::warning(
                format!("tag {tag}"),
                format!(
                    "tag grouping '{tag}' clashes with the imported type '{tag}'; set typesNamespace to qualify types"
                ),
            ));
        }
        declarations.push(Declaration::TagGroup(TagGroup {
            name: tag.to_string(),
            members: members
                .into_iter()
                .map(|(key, callable, _)| (key, callable))
                .collect(),
        }));
    }

    debug!(
        operations = kept.len(),
        skipped = operations.len() - kept.len(),
        imports = imported.len(),
        "synthesized client"
    );
    Ok((Artifact { declarations }, diagnostics))
}

fn ident(name: &str) -> TsExpr {
    TsExpr::Ident(name.to_string())
}

fn string_literal(value: &str) -> TsExpr {
    TsExpr::Literal(TsLiteral::String(value.to_string()))
}

fn call(callee: &str, args: Vec<TsExpr>) -> TsExpr {
    TsExpr::Call {
        callee: Box::new(ident(callee)),
        type_args: Vec::new(),
        args,
    }
}

/// `params.<name>`, bracketed when the name is not an identifier.
fn param_access(name: &str) -> TsExpr {
    TsExpr::Member {
        object: Box::new(ident("params")),
        prop: name.to_string(),
    }
}

/// `{ ...pick(params, [names]), ...options?.<field> }`
fn picked(field: &str, names: &[&str]) -> TsExpr {
    TsExpr::Object(vec![
        ObjectMember::Spread(call(
            "pick",
            vec![
                ident("params"),
                TsExpr::Array(names.iter().map(|n| string_literal(n)).collect()),
            ],
        )),
        ObjectMember::Spread(TsExpr::OptionalMember {
            object: Box::new(ident("options")),
            prop: field.to_string(),
        }),
    ])
}

/// URL expression with every placeholder substituted from `params`.
///
/// Values are coerced with `String(..)` and, when `encode` is set, passed
/// through `encodeURIComponent`.
fn url_expr(path: &str, encode: bool) -> TsExpr {
    let template = PathTemplate::parse(path);
    if template.params().next().is_none() {
        return string_literal(path);
    }
    TsExpr::Template(
        template
            .parts
            .into_iter()
            .map(|part| match part {
                PathPart::Static(text) => TemplatePart::Static(text),
                PathPart::Param(name) => {
                    let text = call("String", vec![param_access(&name)]);
                    TemplatePart::Dynamic(if encode {
                        call("encodeURIComponent", vec![text])
                    } else {
                        text
                    })
                }
            })
            .collect(),
    )
}

/// Generate the callable for one analyzed operation.
fn codegen_callable(
    op: &AnalyzedOperation,
    config: &GeneratorConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> TsFunction {
    let mut params = Vec::new();

    // (a) aggregated params
    let mut fields: Vec<ObjectProperty> = Vec::new();
    for param in op.all_params() {
        if fields.iter().any(|f| f.name == param.name) {
            diagnostics.push(Diagnostic::warning(
                op.location(),
                format!(
                    "parameter '{}' is declared in several locations; one `params` field serves all",
                    param.name
                ),
            ));
            continue;
        }
        fields.push(ObjectProperty {
            name: param.name.clone(),
            ty: param.ty.clone(),
            optional: true,
            readonly: false,
        });
    }
    if !fields.is_empty() {
        params.push(TsParam {
            name: "params".to_string(),
            ty: TypeNode::ObjectOf {
                properties: fields,
                index: None,
            },
            optional: false,
        });
    }

    // (b) request body
    let mutating = op.method.is_state_mutating();
    if let Some(body) = op.body.as_ref().filter(|_| mutating) {
        params.push(TsParam {
            name: "data".to_string(),
            ty: body.ty.clone(),
            optional: !body.required,
        });
    }

    // (c) transport options
    params.push(TsParam {
        name: "options".to_string(),
        ty: TypeNode::Named("TransportOptions".to_string()),
        optional: true,
    });

    let mut members = vec![
        ObjectMember::Property("method".to_string(), string_literal(op.method.as_str())),
        ObjectMember::Property("url".to_string(), url_expr(&op.path, config.encode_path_params)),
    ];
    if mutating {
        let body = if op.body.is_some() {
            ident("data")
        } else {
            TsExpr::Object(Vec::new())
        };
        members.push(ObjectMember::Property("body".to_string(), body));
    }
    members.push(ObjectMember::Property(
        "responseType".to_string(),
        string_literal(op.response.kind.response_type()),
    ));
    members.push(ObjectMember::Spread(ident("options")));
    if !op.header_params.is_empty() {
        let names: Vec<&str> = op.header_params.iter().map(|p| p.name.as_str()).collect();
        members.push(ObjectMember::Property(
            "headers".to_string(),
            picked("headers", &names),
        ));
    }
    if !op.query_params.is_empty() {
        let names: Vec<&str> = op.query_params.iter().map(|p| p.name.as_str()).collect();
        members.push(ObjectMember::Property(
            "query".to_string(),
            picked("query", &names),
        ));
    }

    let request = TsExpr::Call {
        callee: Box::new(ident("request")),
        type_args: vec![op.response.ty.clone()],
        args: vec![TsExpr::Object(members)],
    };

    TsFunction {
        name: callable_name(op),
        doc: op.summary.clone(),
        params,
        body: vec![TsStmt::Return(request)],
    }
}
