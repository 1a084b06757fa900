//! Type Mapper: schema nodes to [`TypeNode`] trees.
//!
//! Mapping is pure. Everything a call produces (the type, the named types it
//! touched, degrade notes) comes back in [`Mapped`] and is merged by the
//! caller; no state is shared between calls.

use indexmap::IndexMap;
use tracing::warn;

use super::resolve::SchemaResolver;
use super::types::{ObjectProperty, PrimitiveType, ReferencedTypes, TypeNode};
use super::utils::enum_value_to_literal;
use crate::error::{Diagnostic, ResolveError};
use crate::spec::{
    AdditionalProperties, CompositeKind, EnumValue, PrimitiveKind, PropertySchema, SchemaKind,
    SchemaNode,
};

/// Domain date/time type declared in the type library.
pub const DATE_TIME: &str = "DateTime";
/// Projection of a type valid when supplying data.
pub const INPUT_VIEW: &str = "InputView";
/// Projection of a type valid when receiving data.
pub const OUTPUT_VIEW: &str = "OutputView";
/// Marker wrapping a read-only property.
pub const READ_ONLY: &str = "ReadOnly";
/// Marker wrapping a write-only property.
pub const WRITE_ONLY: &str = "WriteOnly";

/// Which side of the wire a mapped type describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewFilter {
    /// Full shape
    #[default]
    None,
    /// Data sent to the server: read-only properties are dropped
    Input,
    /// Data received from the server: write-only properties are dropped
    Output,
}

impl ViewFilter {
    fn projection(self) -> Option<&'static str> {
        match self {
            ViewFilter::None => None,
            ViewFilter::Input => Some(INPUT_VIEW),
            ViewFilter::Output => Some(OUTPUT_VIEW),
        }
    }

    fn excludes(self, property: &PropertySchema) -> bool {
        match self {
            ViewFilter::None => false,
            ViewFilter::Input => property.read_only,
            ViewFilter::Output => property.write_only,
        }
    }
}

/// Parameters of one mapping.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'r, 'a> {
    /// Library lookups and declared names
    pub resolver: &'r SchemaResolver<'a>,
    /// Qualifier for names living in an external type library (`Types.`)
    pub prefix: Option<&'r str>,
    /// Projection applied to references and object properties
    pub view: ViewFilter,
    /// Wrap read-only / write-only properties in marker types
    pub project: bool,
}

impl<'r, 'a> MapContext<'r, 'a> {
    /// Unqualified, unprojected mapping over `resolver`.
    pub fn new(resolver: &'r SchemaResolver<'a>) -> Self {
        Self {
            resolver,
            prefix: None,
            view: ViewFilter::None,
            project: false,
        }
    }

    /// Same context under another view.
    pub fn with_view(self, view: ViewFilter) -> Self {
        Self { view, ..self }
    }

    fn named(&self, name: &str) -> TypeNode {
        match self.prefix {
            Some(prefix) => TypeNode::Named(format!("{prefix}{name}")),
            None => TypeNode::Named(name.to_string()),
        }
    }

    fn generic(&self, name: &str, arg: TypeNode) -> TypeNode {
        match self.prefix {
            Some(prefix) => TypeNode::generic(format!("{prefix}{name}"), arg),
            None => TypeNode::generic(name, arg),
        }
    }
}

/// Result of mapping one schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped {
    /// The mapped type
    pub ty: TypeNode,
    /// Unqualified names of every library type the result mentions
    pub refs: ReferencedTypes,
    /// Degraded shapes encountered on the way
    pub notes: Vec<Diagnostic>,
}

impl Mapped {
    fn plain(ty: TypeNode) -> Self {
        Self {
            ty,
            refs: ReferencedTypes::default(),
            notes: Vec::new(),
        }
    }

    fn absorb(&mut self, other: Mapped) -> TypeNode {
        self.refs.merge(other.refs);
        self.notes.extend(other.notes);
        other.ty
    }
}

/// Map `schema` to a type tree.
///
/// `pointer` locates the node in the document and is only used for notes.
/// Fails when a reference names a missing schema or an alias chain loops.
pub fn map_schema(
    schema: &SchemaNode,
    ctx: &MapContext<'_, '_>,
    pointer: &str,
) -> Result<Mapped, ResolveError> {
    let mut mapped = match &schema.kind {
        SchemaKind::Reference(target) => map_reference(schema, target, ctx)?,
        SchemaKind::Composite { kind, members } => map_composite(*kind, members, ctx, pointer)?,
        SchemaKind::Array(items) => {
            let mut out = Mapped::plain(TypeNode::primitive(PrimitiveType::Unknown));
            let inner = map_schema(items, ctx, &format!("{pointer}/items"))?;
            out.ty = TypeNode::ArrayOf(Box::new(out.absorb(inner)));
            out
        }
        SchemaKind::Object {
            properties,
            additional_properties,
        } => map_object(properties, additional_properties, ctx, pointer)?,
        SchemaKind::Primitive {
            kind,
            format,
            enum_values,
        } => map_primitive(*kind, format.as_deref(), enum_values.as_deref(), ctx),
        SchemaKind::Untyped => unsupported(pointer),
    };

    if schema.nullable {
        mapped.ty = mapped.ty.nullable();
    }
    Ok(mapped)
}

fn map_reference(
    schema: &SchemaNode,
    target: &str,
    ctx: &MapContext<'_, '_>,
) -> Result<Mapped, ResolveError> {
    ctx.resolver.resolve_name(target)?;
    let name = ctx.resolver.type_name(target);
    let mut mapped = Mapped::plain(ctx.named(&name));
    mapped.refs.insert(name);

    if let Some(view) = ctx.view.projection() {
        if !ctx.resolver.is_enumeration(schema) {
            mapped.ty = ctx.generic(view, mapped.ty);
            mapped.refs.insert(view);
        }
    }
    Ok(mapped)
}

fn map_composite(
    kind: CompositeKind,
    members: &[SchemaNode],
    ctx: &MapContext<'_, '_>,
    pointer: &str,
) -> Result<Mapped, ResolveError> {
    if members.is_empty() {
        return Ok(unsupported(pointer));
    }

    let keyword = match kind {
        CompositeKind::AllOf => "allOf",
        CompositeKind::OneOf => "oneOf",
    };
    let mut out = Mapped::plain(TypeNode::primitive(PrimitiveType::Unknown));
    let mut types = Vec::with_capacity(members.len());
    for (i, member) in members.iter().enumerate() {
        let mapped = map_schema(member, ctx, &format!("{pointer}/{keyword}/{i}"))?;
        types.push(out.absorb(mapped));
    }

    out.ty = match kind {
        CompositeKind::AllOf => TypeNode::product(types),
        CompositeKind::OneOf => TypeNode::sum(types),
    };
    Ok(out)
}

fn map_object(
    properties: &IndexMap<String, PropertySchema>,
    additional: &AdditionalProperties,
    ctx: &MapContext<'_, '_>,
    pointer: &str,
) -> Result<Mapped, ResolveError> {
    let mut out = Mapped::plain(TypeNode::primitive(PrimitiveType::Unknown));
    let mut props = Vec::with_capacity(properties.len());

    for (name, property) in properties {
        if ctx.view.excludes(property) {
            continue;
        }
        let mapped = map_schema(
            &property.schema,
            ctx,
            &format!("{pointer}/properties/{name}"),
        )?;
        let mut ty = out.absorb(mapped);

        if ctx.project && ctx.view == ViewFilter::None && property.read_only != property.write_only
        {
            let marker = if property.read_only {
                READ_ONLY
            } else {
                WRITE_ONLY
            };
            ty = ctx.generic(marker, ty);
            out.refs.insert(marker);
        }

        props.push(ObjectProperty {
            name: name.clone(),
            ty,
            optional: !property.required,
            readonly: property.read_only,
        });
    }

    let index = match additional {
        AdditionalProperties::Schema(schema) => {
            let mapped = map_schema(schema, ctx, &format!("{pointer}/additionalProperties"))?;
            Some(Box::new(out.absorb(mapped)))
        }
        AdditionalProperties::Absent | AdditionalProperties::Allowed(_) => None,
    };

    out.ty = TypeNode::ObjectOf {
        properties: props,
        index,
    };
    Ok(out)
}

fn map_primitive(
    kind: PrimitiveKind,
    format: Option<&str>,
    enum_values: Option<&[EnumValue]>,
    ctx: &MapContext<'_, '_>,
) -> Mapped {
    let literals = enum_values
        .filter(|values| !values.is_empty())
        .map(|values| TypeNode::LiteralSet(values.iter().map(enum_value_to_literal).collect()));

    match kind {
        PrimitiveKind::Boolean | PrimitiveKind::Integer | PrimitiveKind::Number => {
            let ty = literals.unwrap_or_else(|| {
                TypeNode::primitive(match kind {
                    PrimitiveKind::Boolean => PrimitiveType::Boolean,
                    PrimitiveKind::Integer => PrimitiveType::Integer,
                    _ => PrimitiveType::Number,
                })
            });
            Mapped::plain(ty)
        }
        PrimitiveKind::String if matches!(format, Some("date" | "date-time")) => {
            let mut mapped = Mapped::plain(ctx.named(DATE_TIME));
            mapped.refs.insert(DATE_TIME);
            mapped
        }
        PrimitiveKind::String => {
            Mapped::plain(literals.unwrap_or(TypeNode::primitive(PrimitiveType::String)))
        }
        PrimitiveKind::Null => Mapped::plain(TypeNode::primitive(PrimitiveType::Null)),
    }
}

fn unsupported(pointer: &str) -> Mapped {
    warn!(pointer, "unsupported schema shape, mapping to any");
    let mut mapped = Mapped::plain(TypeNode::primitive(PrimitiveType::Any));
    mapped.notes.push(Diagnostic::warning(
        pointer,
        "unsupported schema shape, emitted as `any`",
    ));
    mapped
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ir::types::TsLiteral;

    fn library(json: &str) -> IndexMap<String, SchemaNode> {
        serde_json::from_str(json).unwrap()
    }

    fn node(json: &str) -> SchemaNode {
        serde_json::from_str(json).unwrap()
    }

    fn map(schema: &SchemaNode, ctx: &MapContext<'_, '_>) -> Mapped {
        map_schema(schema, ctx, "#/test").unwrap()
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let schemas = library(r#"{ "Tag": { "type": "string" } }"#);
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);
        let schema = node(
            r##"{
              "type": "object",
              "required": ["id"],
              "properties": {
                "id": { "type": "integer" },
                "tags": { "type": "array", "items": { "$ref": "#/components/schemas/Tag" } },
                "kind": { "oneOf": [{ "type": "string" }, { "type": "number" }] }
              }
            }"##,
        );
        assert_eq!(map(&schema, &ctx), map(&schema, &ctx));
    }

    #[test]
    fn test_string_enum_collapses_to_literal_set() {
        let schemas = IndexMap::new();
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);

        let two = map(&node(r#"{ "type": "string", "enum": ["A", "B"] }"#), &ctx);
        assert_eq!(
            two.ty,
            TypeNode::LiteralSet(vec![
                TsLiteral::String("A".into()),
                TsLiteral::String("B".into())
            ])
        );

        let one = map(&node(r#"{ "type": "string", "enum": ["A"] }"#), &ctx);
        assert_eq!(
            one.ty,
            TypeNode::LiteralSet(vec![TsLiteral::String("A".into())])
        );
        assert!(!matches!(one.ty, TypeNode::SumOf(_)));
    }

    #[test]
    fn test_nullable_integer() {
        let schemas = IndexMap::new();
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);

        let nullable = map(&node(r#"{ "type": "integer", "nullable": true }"#), &ctx);
        assert_eq!(
            nullable.ty,
            TypeNode::Nullable(Box::new(TypeNode::Primitive(PrimitiveType::Integer)))
        );

        let plain = map(&node(r#"{ "type": "integer" }"#), &ctx);
        assert_eq!(plain.ty, TypeNode::Primitive(PrimitiveType::Integer));
    }

    #[test]
    fn test_single_member_all_of_has_no_wrapper() {
        let schemas = library(r#"{ "Base": { "type": "object" } }"#);
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);

        let mapped = map(
            &node(r##"{ "allOf": [{ "$ref": "#/components/schemas/Base" }] }"##),
            &ctx,
        );
        assert_eq!(mapped.ty, TypeNode::Named("Base".into()));
    }

    #[test]
    fn test_all_of_and_one_of_combine() {
        let schemas = library(r#"{ "A": { "type": "object" }, "B": { "type": "object" } }"#);
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);

        let product = map(
            &node(
                r##"{ "allOf": [{ "$ref": "#/components/schemas/A" }, { "$ref": "#/components/schemas/B" }] }"##,
            ),
            &ctx,
        );
        assert!(matches!(product.ty, TypeNode::ProductOf(ref m) if m.len() == 2));
        assert_eq!(product.refs.iter().collect::<Vec<_>>(), ["A", "B"]);

        let sum = map(
            &node(r#"{ "anyOf": [{ "type": "string" }, { "type": "boolean" }] }"#),
            &ctx,
        );
        assert!(matches!(sum.ty, TypeNode::SumOf(ref m) if m.len() == 2));
    }

    #[test]
    fn test_reference_is_never_inlined() {
        let schemas = library(
            r##"{
              "Node": {
                "type": "object",
                "properties": { "next": { "$ref": "#/components/schemas/Node" } }
              }
            }"##,
        );
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);

        let mapped = map(&schemas["Node"], &ctx);
        let TypeNode::ObjectOf { properties, .. } = &mapped.ty else {
            panic!("expected object, got {:?}", mapped.ty);
        };
        assert_eq!(properties[0].ty, TypeNode::Named("Node".into()));
        assert!(mapped.refs.contains("Node"));
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let schemas = IndexMap::new();
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);

        let err = map_schema(
            &node(r##"{ "$ref": "#/components/schemas/Missing" }"##),
            &ctx,
            "#/test",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolveError::Unresolved {
                name: "Missing".into()
            }
        );
    }

    #[test]
    fn test_view_filters_properties() {
        let schemas = IndexMap::new();
        let resolver = SchemaResolver::new(&schemas);
        let schema = node(
            r#"{
              "type": "object",
              "properties": {
                "id": { "type": "string", "readOnly": true },
                "password": { "type": "string", "writeOnly": true },
                "name": { "type": "string" }
              }
            }"#,
        );

        let names = |view| {
            let ctx = MapContext::new(&resolver).with_view(view);
            match map(&schema, &ctx).ty {
                TypeNode::ObjectOf { properties, .. } => properties
                    .into_iter()
                    .map(|p| p.name)
                    .collect::<Vec<_>>(),
                other => panic!("expected object, got {other:?}"),
            }
        };

        assert_eq!(names(ViewFilter::Input), ["password", "name"]);
        assert_eq!(names(ViewFilter::Output), ["id", "name"]);
        assert_eq!(names(ViewFilter::None), ["id", "password", "name"]);
    }

    #[test]
    fn test_view_wraps_references_except_enumerations() {
        let schemas = library(
            r#"{
              "User": { "type": "object" },
              "Status": { "type": "string", "enum": ["on", "off"] }
            }"#,
        );
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver).with_view(ViewFilter::Output);

        let user = map(&node(r##"{ "$ref": "#/components/schemas/User" }"##), &ctx);
        assert_eq!(
            user.ty,
            TypeNode::generic(OUTPUT_VIEW, TypeNode::Named("User".into()))
        );
        assert!(user.refs.contains(OUTPUT_VIEW));

        let status = map(&node(r##"{ "$ref": "#/components/schemas/Status" }"##), &ctx);
        assert_eq!(status.ty, TypeNode::Named("Status".into()));
    }

    #[test]
    fn test_view_skips_aliases_of_enumerations() {
        let schemas = library(
            r##"{
              "Status": { "type": "string", "enum": ["on", "off"] },
              "State": { "$ref": "#/components/schemas/Status" }
            }"##,
        );
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver).with_view(ViewFilter::Input);

        let state = map(&node(r##"{ "$ref": "#/components/schemas/State" }"##), &ctx);
        assert_eq!(state.ty, TypeNode::Named("State".into()));
        assert!(!state.refs.contains(INPUT_VIEW));
    }

    #[test]
    fn test_reference_uses_suffixed_name_on_collision() {
        let schemas = library(
            r#"{
              "User.Profile": { "type": "object" },
              "User_Profile": { "type": "object" }
            }"#,
        );
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);

        let mapped = map(&node(r##"{ "$ref": "#/components/schemas/User_Profile" }"##), &ctx);
        assert_eq!(mapped.ty, TypeNode::Named("User_Profile2".into()));
        assert!(mapped.refs.contains("User_Profile2"));
    }

    #[test]
    fn test_projection_markers() {
        let schemas = IndexMap::new();
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext {
            project: true,
            ..MapContext::new(&resolver)
        };
        let mapped = map(
            &node(r#"{ "type": "object", "properties": { "id": { "type": "string", "readOnly": true } } }"#),
            &ctx,
        );
        let TypeNode::ObjectOf { properties, .. } = &mapped.ty else {
            panic!("expected object");
        };
        assert_eq!(
            properties[0].ty,
            TypeNode::generic(READ_ONLY, TypeNode::Primitive(PrimitiveType::String))
        );
        assert!(properties[0].readonly && properties[0].optional);
        assert!(mapped.refs.contains(READ_ONLY));
    }

    #[test]
    fn test_prefix_qualifies_names() {
        let schemas = library(r#"{ "User": { "type": "object" } }"#);
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext {
            prefix: Some("Types."),
            ..MapContext::new(&resolver)
        };
        let mapped = map(&node(r##"{ "$ref": "#/components/schemas/User" }"##), &ctx);
        assert_eq!(mapped.ty, TypeNode::Named("Types.User".into()));
        assert!(mapped.refs.contains("User"));
    }

    #[test]
    fn test_date_formats_map_to_date_time() {
        let schemas = IndexMap::new();
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);
        let mapped = map(
            &node(r#"{ "type": "string", "format": "date-time", "nullable": true }"#),
            &ctx,
        );
        assert_eq!(
            mapped.ty,
            TypeNode::Nullable(Box::new(TypeNode::Named(DATE_TIME.into())))
        );
        assert!(mapped.refs.contains(DATE_TIME));
    }

    #[test]
    fn test_additional_properties_schema_is_index_signature() {
        let schemas = IndexMap::new();
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);
        let mapped = map(
            &node(r#"{ "type": "object", "additionalProperties": { "type": "integer" } }"#),
            &ctx,
        );
        assert_eq!(
            mapped.ty,
            TypeNode::ObjectOf {
                properties: vec![],
                index: Some(Box::new(TypeNode::Primitive(PrimitiveType::Integer))),
            }
        );
    }

    #[test]
    fn test_untyped_degrades_to_any_with_note() {
        let schemas = IndexMap::new();
        let resolver = SchemaResolver::new(&schemas);
        let ctx = MapContext::new(&resolver);
        let mapped = map(&node("{}"), &ctx);
        assert_eq!(mapped.ty, TypeNode::Primitive(PrimitiveType::Any));
        assert_eq!(mapped.notes.len(), 1);
        assert_eq!(mapped.notes[0].location, "#/test");
    }
}
