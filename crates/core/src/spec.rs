//! OpenAPI document structs for serde deserialization.
//!
//! This module defines the subset of OpenAPI 3.0 / 3.1 the generator reads.
//! Schemas are lowered into the tagged [`SchemaNode`] union while they are
//! deserialized, so the rest of the pipeline matches on shape instead of
//! testing optional keywords. Every map that carries declaration order is an
//! [`IndexMap`].

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::GenerateError;
use crate::ir::HttpMethod;

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Root OpenAPI document.
#[derive(Debug, Deserialize)]
pub struct OpenApiSpec {
    /// Path templates mapped to their operations, in declaration order.
    pub paths: IndexMap<String, PathItem>,
    /// Reusable definitions.
    #[serde(default)]
    pub components: Components,
}

/// Components section containing reusable schemas and operation parts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// The schema library, keyed by name.
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaNode>,
    /// Shared parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, ReferenceOr<Parameter>>,
    /// Shared request bodies.
    #[serde(default)]
    pub request_bodies: IndexMap<String, ReferenceOr<RequestBody>>,
    /// Shared responses.
    #[serde(default)]
    pub responses: IndexMap<String, ReferenceOr<Response>>,
}

/// Either an inline object or a `$ref` pointing into `components`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    /// `{ "$ref": "#/components/..." }`
    Reference {
        /// The raw JSON pointer.
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// An inline definition.
    Item(T),
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Default, Deserialize)]
pub struct PathItem {
    /// GET operation.
    pub get: Option<Operation>,
    /// PUT operation.
    pub put: Option<Operation>,
    /// POST operation.
    pub post: Option<Operation>,
    /// DELETE operation.
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    pub options: Option<Operation>,
    /// HEAD operation.
    pub head: Option<Operation>,
    /// PATCH operation.
    pub patch: Option<Operation>,
    /// TRACE operation.
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
}

impl PathItem {
    /// Declared operations in the fixed OpenAPI method order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, self.get.as_ref()),
            (HttpMethod::Put, self.put.as_ref()),
            (HttpMethod::Post, self.post.as_ref()),
            (HttpMethod::Delete, self.delete.as_ref()),
            (HttpMethod::Options, self.options.as_ref()),
            (HttpMethod::Head, self.head.as_ref()),
            (HttpMethod::Patch, self.patch.as_ref()),
            (HttpMethod::Trace, self.trace.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|op| (method, op)))
    }
}

/// An API operation (endpoint).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Declared operation id; synthesized from the path when absent.
    pub operation_id: Option<String>,
    /// Short description, carried into the callable's JSDoc.
    pub summary: Option<String>,
    /// Tags; the operation is grouped under each of them.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation-level parameters, overriding path-level ones.
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
    /// Request body, inline or referenced.
    pub request_body: Option<ReferenceOr<RequestBody>>,
    /// Responses keyed by status code, in declaration order.
    #[serde(default)]
    pub responses: IndexMap<String, ReferenceOr<Response>>,
}

/// Where a parameter is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// `in: path`
    Path,
    /// `in: query`
    Query,
    /// `in: header`
    Header,
    /// `in: cookie`
    Cookie,
    /// Anything else.
    #[serde(other)]
    Other,
}

/// A parameter (path, query, header or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// The `in` keyword.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Declared required.
    #[serde(default)]
    pub required: bool,
    /// Value schema; absent means a string.
    pub schema: Option<SchemaNode>,
}

/// A request body definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// Declared required.
    #[serde(default)]
    pub required: bool,
    /// Media types in declaration order.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Response description.
    pub description: Option<String>,
    /// Media types in declaration order; empty for no content.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<SchemaNode>,
}

/// One schema definition, either in the library or inline in an operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSchema")]
pub struct SchemaNode {
    /// The shape of the schema.
    pub kind: SchemaKind,
    /// `null` is an accepted value.
    pub nullable: bool,
    /// `readOnly: true` was declared on this node.
    pub read_only: bool,
    /// `writeOnly: true` was declared on this node.
    pub write_only: bool,
}

/// Shape of a [`SchemaNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// A named reference into the schema library.
    Reference(String),
    /// `allOf` / `oneOf` / `anyOf`.
    Composite {
        /// Conjunction or alternatives.
        kind: CompositeKind,
        /// Member schemas, `null` members removed.
        members: Vec<SchemaNode>,
    },
    /// `type: array`.
    Array(Box<SchemaNode>),
    /// `type: object` or a schema carrying properties.
    Object {
        /// Declared properties in document order.
        properties: IndexMap<String, PropertySchema>,
        /// The `additionalProperties` keyword.
        additional_properties: AdditionalProperties,
    },
    /// Scalar types, optionally restricted to a literal set.
    Primitive {
        /// Scalar type.
        kind: PrimitiveKind,
        /// The `format` keyword, e.g. `date-time`.
        format: Option<String>,
        /// The `enum` list, or a single `const` value.
        enum_values: Option<Vec<EnumValue>>,
    },
    /// No usable type information.
    Untyped,
}

/// Composition keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    /// `allOf`
    AllOf,
    /// `oneOf` and `anyOf`
    OneOf,
}

/// Scalar schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
}

/// An object property with the facts lifted from its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySchema {
    /// Property value schema.
    pub schema: SchemaNode,
    /// Listed in the parent's `required`.
    pub required: bool,
    /// `readOnly: true`
    pub read_only: bool,
    /// `writeOnly: true`
    pub write_only: bool,
}

/// `additionalProperties` keyword.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdditionalProperties {
    /// Not declared.
    #[default]
    Absent,
    /// `true` or `false`.
    Allowed(bool),
    /// A value schema for every extra key.
    Schema(Box<SchemaNode>),
}

/// Enum value can be string, integer, float, boolean, or null.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// String member.
    String(String),
    /// Integral member.
    Integer(i64),
    /// Non-integral number.
    Float(f64),
    /// Boolean member.
    Bool(bool),
    /// `null` member.
    Null,
}

impl SchemaNode {
    /// Build a non-nullable node of the given shape.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
            read_only: false,
            write_only: false,
        }
    }

    /// Literal values, if this node is an enumerated primitive.
    pub fn enum_values(&self) -> Option<&[EnumValue]> {
        match &self.kind {
            SchemaKind::Primitive {
                enum_values: Some(values),
                ..
            } if !values.is_empty() => Some(values),
            _ => None,
        }
    }

    /// Visit this node and every node nested inside it.
    ///
    /// References are not followed.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SchemaNode)) {
        visit(self);
        match &self.kind {
            SchemaKind::Composite { members, .. } => {
                for member in members {
                    member.walk(visit);
                }
            }
            SchemaKind::Array(items) => items.walk(visit),
            SchemaKind::Object {
                properties,
                additional_properties,
            } => {
                for property in properties.values() {
                    property.schema.walk(visit);
                }
                if let AdditionalProperties::Schema(schema) = additional_properties {
                    schema.walk(visit);
                }
            }
            SchemaKind::Reference(_) | SchemaKind::Primitive { .. } | SchemaKind::Untyped => {}
        }
    }
}

impl OpenApiSpec {
    /// Parse an OpenAPI document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, GenerateError> {
        serde_json::from_str(json).map_err(|e| {
            GenerateError::Document(format!("Failed to parse OpenAPI document: {e}"))
        })
    }

    /// Parse an OpenAPI document from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, GenerateError> {
        serde_yaml::from_str(yaml).map_err(|e| {
            GenerateError::Document(format!("Failed to parse OpenAPI document: {e}"))
        })
    }

    /// Parse JSON when the text looks like a JSON object, YAML otherwise.
    pub fn parse(text: &str) -> Result<Self, GenerateError> {
        if text.trim_start().starts_with('{') {
            Self::from_json(text)
        } else {
            Self::from_yaml(text)
        }
    }

    /// Every schema node reachable from the document, library first.
    pub fn all_schemas(&self) -> Vec<&SchemaNode> {
        let mut roots: Vec<&SchemaNode> = self.components.schemas.values().collect();
        let params = self
            .components
            .parameters
            .values()
            .chain(self.paths.values().flat_map(|item| item.parameters.iter()));
        roots.extend(params.filter_map(|p| match p {
            ReferenceOr::Item(p) => p.schema.as_ref(),
            ReferenceOr::Reference { .. } => None,
        }));
        for item in self.paths.values() {
            for (_, op) in item.operations() {
                roots.extend(op.parameters.iter().filter_map(|p| match p {
                    ReferenceOr::Item(p) => p.schema.as_ref(),
                    ReferenceOr::Reference { .. } => None,
                }));
                if let Some(ReferenceOr::Item(body)) = &op.request_body {
                    roots.extend(body.content.values().filter_map(|m| m.schema.as_ref()));
                }
                for response in op.responses.values() {
                    if let ReferenceOr::Item(response) = response {
                        roots.extend(response.content.values().filter_map(|m| m.schema.as_ref()));
                    }
                }
            }
        }
        let mut all = Vec::new();
        for root in roots {
            root.walk(&mut |node| all.push(node));
        }
        all
    }
}

/// Extract the schema name from a `$ref` pointer.
///
/// `#/components/schemas/User` yields `User`; other pointers yield their last
/// segment with JSON-pointer escapes decoded.
pub fn ref_to_schema_name(reference: &str) -> String {
    let tail = reference
        .strip_prefix(SCHEMA_REF_PREFIX)
        .unwrap_or_else(|| reference.rsplit('/').next().unwrap_or(reference));
    tail.replace("~1", "/").replace("~0", "~")
}

// =============================================================================
// Raw JSON Schema shape
// =============================================================================

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawType {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawAdditional {
    Bool(bool),
    Schema(Box<SchemaNode>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    #[serde(rename = "type")]
    schema_type: Option<RawType>,
    #[serde(rename = "$ref")]
    ref_path: Option<String>,
    properties: Option<IndexMap<String, SchemaNode>>,
    #[serde(default)]
    required: Vec<String>,
    items: Option<Box<SchemaNode>>,
    #[serde(rename = "enum")]
    enum_values: Option<Vec<EnumValue>>,
    #[serde(rename = "const")]
    const_value: Option<serde_json::Value>,
    any_of: Option<Vec<SchemaNode>>,
    one_of: Option<Vec<SchemaNode>>,
    all_of: Option<Vec<SchemaNode>>,
    additional_properties: Option<RawAdditional>,
    format: Option<String>,
    nullable: Option<bool>,
    #[serde(default)]
    read_only: bool,
    #[serde(default)]
    write_only: bool,
}

impl From<RawSchema> for SchemaNode {
    fn from(raw: RawSchema) -> Self {
        let mut nullable = raw.nullable == Some(true);

        let types: Vec<&str> = match &raw.schema_type {
            Some(RawType::Single(t)) => vec![t.as_str()],
            Some(RawType::Multiple(ts)) => ts.iter().map(String::as_str).collect(),
            None => Vec::new(),
        };
        let non_null: Vec<&str> = types.iter().copied().filter(|t| *t != "null").collect();
        if non_null.len() < types.len() && !non_null.is_empty() {
            nullable = true;
        }

        let kind = if let Some(reference) = &raw.ref_path {
            SchemaKind::Reference(ref_to_schema_name(reference))
        } else if let Some(members) = &raw.all_of {
            SchemaKind::Composite {
                kind: CompositeKind::AllOf,
                members: members.clone(),
            }
        } else if let Some(members) = raw.one_of.as_ref().or(raw.any_of.as_ref()) {
            let (nulls, rest): (Vec<_>, Vec<_>) = members.iter().cloned().partition(is_null_node);
            if !nulls.is_empty() {
                nullable = true;
            }
            SchemaKind::Composite {
                kind: CompositeKind::OneOf,
                members: rest,
            }
        } else if let Some(value) = &raw.const_value {
            const_kind(value)
        } else {
            match non_null.as_slice() {
                [] if types.is_empty() => shape_without_type(&raw),
                [] => shape_for_type("null", &raw),
                [single] => shape_for_type(single, &raw),
                many => SchemaKind::Composite {
                    kind: CompositeKind::OneOf,
                    members: many
                        .iter()
                        .map(|t| SchemaNode::new(shape_for_type(t, &raw)))
                        .collect(),
                },
            }
        };

        Self {
            kind,
            nullable,
            read_only: raw.read_only,
            write_only: raw.write_only,
        }
    }
}

fn is_null_node(node: &SchemaNode) -> bool {
    matches!(
        node.kind,
        SchemaKind::Primitive {
            kind: PrimitiveKind::Null,
            ..
        }
    )
}

fn shape_for_type(schema_type: &str, raw: &RawSchema) -> SchemaKind {
    let primitive = |kind| SchemaKind::Primitive {
        kind,
        format: raw.format.clone(),
        enum_values: raw.enum_values.clone(),
    };
    match schema_type {
        "string" => primitive(PrimitiveKind::String),
        "number" => primitive(PrimitiveKind::Number),
        "integer" => primitive(PrimitiveKind::Integer),
        "boolean" => primitive(PrimitiveKind::Boolean),
        "null" => primitive(PrimitiveKind::Null),
        "array" => SchemaKind::Array(
            raw.items
                .clone()
                .unwrap_or_else(|| Box::new(SchemaNode::new(SchemaKind::Untyped))),
        ),
        "object" => object_shape(raw),
        _ => SchemaKind::Untyped,
    }
}

fn shape_without_type(raw: &RawSchema) -> SchemaKind {
    if raw.properties.is_some() || raw.additional_properties.is_some() {
        object_shape(raw)
    } else if raw.items.is_some() {
        shape_for_type("array", raw)
    } else if let Some(values) = &raw.enum_values {
        SchemaKind::Primitive {
            kind: infer_enum_kind(values),
            format: raw.format.clone(),
            enum_values: Some(values.clone()),
        }
    } else {
        SchemaKind::Untyped
    }
}

fn object_shape(raw: &RawSchema) -> SchemaKind {
    let properties = raw
        .properties
        .iter()
        .flatten()
        .map(|(name, schema)| {
            let property = PropertySchema {
                required: raw.required.contains(name),
                read_only: schema.read_only,
                write_only: schema.write_only,
                schema: schema.clone(),
            };
            (name.clone(), property)
        })
        .collect();
    let additional_properties = match &raw.additional_properties {
        None => AdditionalProperties::Absent,
        Some(RawAdditional::Bool(allowed)) => AdditionalProperties::Allowed(*allowed),
        Some(RawAdditional::Schema(schema)) => AdditionalProperties::Schema(schema.clone()),
    };
    SchemaKind::Object {
        properties,
        additional_properties,
    }
}

fn infer_enum_kind(values: &[EnumValue]) -> PrimitiveKind {
    values
        .iter()
        .find_map(|v| match v {
            EnumValue::String(_) => Some(PrimitiveKind::String),
            EnumValue::Integer(_) => Some(PrimitiveKind::Integer),
            EnumValue::Float(_) => Some(PrimitiveKind::Number),
            EnumValue::Bool(_) => Some(PrimitiveKind::Boolean),
            EnumValue::Null => None,
        })
        .unwrap_or(PrimitiveKind::String)
}

fn const_kind(value: &serde_json::Value) -> SchemaKind {
    let literal = match value {
        serde_json::Value::Null => EnumValue::Null,
        serde_json::Value::Bool(b) => EnumValue::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => EnumValue::Integer(i),
            None => EnumValue::Float(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => EnumValue::String(s.clone()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            return SchemaKind::Untyped;
        }
    };
    let values = vec![literal];
    SchemaKind::Primitive {
        kind: infer_enum_kind(&values),
        format: None,
        enum_values: Some(values),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn schema(json: &str) -> SchemaNode {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_ref_lowers_to_reference() {
        let node = schema(r##"{ "$ref": "#/components/schemas/User" }"##);
        assert_eq!(node.kind, SchemaKind::Reference("User".into()));
        assert!(!node.nullable);
    }

    #[test]
    fn test_ref_to_schema_name_decodes_pointer_escapes() {
        assert_eq!(ref_to_schema_name("#/components/schemas/a~1b"), "a/b");
        assert_eq!(ref_to_schema_name("#/definitions/Pet"), "Pet");
    }

    #[test]
    fn test_anyof_with_null_sets_nullable() {
        let node = schema(r#"{ "anyOf": [{ "type": "string" }, { "type": "null" }] }"#);
        assert!(node.nullable);
        let SchemaKind::Composite { kind, members } = &node.kind else {
            panic!("expected composite, got {:?}", node.kind);
        };
        assert_eq!(*kind, CompositeKind::OneOf);
        assert_eq!(members.len(), 1);
    }

    #[test]
    fn test_type_array_with_null() {
        let node = schema(r#"{ "type": ["integer", "null"] }"#);
        assert!(node.nullable);
        assert!(matches!(
            node.kind,
            SchemaKind::Primitive {
                kind: PrimitiveKind::Integer,
                ..
            }
        ));
    }

    #[test]
    fn test_openapi_30_nullable_flag() {
        let node = schema(r#"{ "type": "integer", "nullable": true }"#);
        assert!(node.nullable);
    }

    #[test]
    fn test_object_lifts_required_and_read_only() {
        let node = schema(
            r#"{
              "type": "object",
              "required": ["id"],
              "properties": {
                "id": { "type": "string", "readOnly": true },
                "secret": { "type": "string", "writeOnly": true }
              }
            }"#,
        );
        let SchemaKind::Object { properties, .. } = &node.kind else {
            panic!("expected object");
        };
        let id = &properties["id"];
        assert!(id.required && id.read_only && !id.write_only);
        let secret = &properties["secret"];
        assert!(!secret.required && secret.write_only);
        let keys: Vec<_> = properties.keys().cloned().collect();
        assert_eq!(keys, ["id", "secret"]);
    }

    #[test]
    fn test_enum_without_type_infers_kind() {
        let node = schema(r#"{ "enum": [1, 2, 3] }"#);
        assert!(matches!(
            node.kind,
            SchemaKind::Primitive {
                kind: PrimitiveKind::Integer,
                ..
            }
        ));
        assert_eq!(node.enum_values().map(<[EnumValue]>::len), Some(3));
    }

    #[test]
    fn test_const_becomes_single_value_enum() {
        let node = schema(r#"{ "const": "fixed" }"#);
        assert_eq!(
            node.enum_values(),
            Some(&[EnumValue::String("fixed".into())][..])
        );
    }

    #[test]
    fn test_empty_schema_is_untyped() {
        assert_eq!(schema("{}").kind, SchemaKind::Untyped);
    }

    #[test]
    fn test_responses_keep_declaration_order() {
        let op: Operation = serde_json::from_str(
            r#"{ "responses": { "404": { "description": "x" }, "200": { "description": "y" } } }"#,
        )
        .unwrap();
        let codes: Vec<_> = op.responses.keys().cloned().collect();
        assert_eq!(codes, ["404", "200"]);
    }

    #[test]
    fn test_parameter_reference_or_item() {
        let params: Vec<ReferenceOr<Parameter>> = serde_json::from_str(
            r##"[
              { "$ref": "#/components/parameters/Limit" },
              { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
            ]"##,
        )
        .unwrap();
        assert!(matches!(params[0], ReferenceOr::Reference { .. }));
        let ReferenceOr::Item(p) = &params[1] else {
            panic!("expected inline parameter");
        };
        assert_eq!(p.location, ParameterLocation::Path);
    }

    #[test]
    fn test_parse_yaml_document() {
        let yaml = "paths:\n  /ping:\n    get:\n      responses:\n        '200':\n          description: ok\n";
        let spec = OpenApiSpec::parse(yaml).unwrap();
        assert!(spec.paths.contains_key("/ping"));
    }

    #[test]
    fn test_missing_paths_is_an_error() {
        assert!(OpenApiSpec::from_json(r#"{ "openapi": "3.1.0" }"#).is_err());
    }
}
