//! TypeScript code emission via the Emit trait.
//!
//! Each IR type implements `Emit`; artifacts are emitted by concatenating
//! their declarations. Emission is purely mechanical string building.

use super::types::{
    Artifact, Declaration, Helper, ImportItems, ObjectMember, ObjectProperty, PrimitiveType,
    TagGroup, TemplatePart, TsExpr, TsFunction, TsImport, TsLiteral, TsParam, TsStmt, TsTypeDef,
    TypeDefKind, TypeNode,
};
use super::utils::{escape_js_string, needs_bracket_notation, quote_if_needed};

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// Generated by tsgen. Do not edit by hand.\n";

/// Trait for emitting TypeScript code from IR nodes.
pub trait Emit {
    /// Convert the node to its TypeScript string representation.
    fn emit(&self) -> String;
}

// =============================================================================
// Primitive Types
// =============================================================================

impl Emit for PrimitiveType {
    fn emit(&self) -> String {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number | PrimitiveType::Integer => "number",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Null => "null",
            PrimitiveType::Any => "any",
            PrimitiveType::Unknown => "unknown",
            PrimitiveType::Void => "void",
        }
        .to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

/// True if `ty` renders as a top-level `|` or `&` chain.
fn is_compound(ty: &TypeNode) -> bool {
    match ty {
        TypeNode::SumOf(members) | TypeNode::ProductOf(members) => members.len() > 1,
        TypeNode::LiteralSet(values) => values.len() > 1,
        TypeNode::Nullable(_) => true,
        _ => false,
    }
}

fn paren_if(wrap: bool, s: String) -> String {
    if wrap { format!("({s})") } else { s }
}

impl Emit for TypeNode {
    fn emit(&self) -> String {
        match self {
            TypeNode::Named(name) => name.clone(),
            TypeNode::Generic { name, args } => {
                let args = args.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("{name}<{args}>")
            }
            TypeNode::ArrayOf(inner) => format!("{}[]", paren_if(is_compound(inner), inner.emit())),
            TypeNode::ObjectOf { properties, index } => {
                if properties.is_empty() && index.is_none() {
                    return "{}".to_string();
                }
                let mut parts: Vec<_> = properties.iter().map(Emit::emit).collect();
                if let Some(index) = index {
                    parts.push(format!("[key: string]: {}", index.emit()));
                }
                format!("{{ {} }}", parts.join("; "))
            }
            TypeNode::SumOf(members) if members.is_empty() => "never".to_string(),
            TypeNode::SumOf(members) => members.iter().map(Emit::emit).collect::<Vec<_>>().join(" | "),
            TypeNode::ProductOf(members) if members.is_empty() => "unknown".to_string(),
            TypeNode::ProductOf(members) => members
                .iter()
                .map(|m| paren_if(is_compound(m) && !matches!(m, TypeNode::ProductOf(_)), m.emit()))
                .collect::<Vec<_>>()
                .join(" & "),
            TypeNode::LiteralSet(values) if values.is_empty() => "never".to_string(),
            TypeNode::LiteralSet(values) => {
                values.iter().map(Emit::emit).collect::<Vec<_>>().join(" | ")
            }
            TypeNode::Primitive(p) => p.emit(),
            TypeNode::Nullable(inner) => format!("{} | null", inner.emit()),
        }
    }
}

impl Emit for ObjectProperty {
    fn emit(&self) -> String {
        let readonly = if self.readonly { "readonly " } else { "" };
        let opt = if self.optional { "?" } else { "" };
        format!("{readonly}{}{opt}: {}", quote_if_needed(&self.name), self.ty.emit())
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        match &self.kind {
            TypeDefKind::TypeAlias {
                ty: TypeNode::ObjectOf { properties, index },
            } if !properties.is_empty() => {
                let mut output = format!("export type {} = {{\n", self.name);
                for prop in properties {
                    output.push_str(&format!("  {};\n", prop.emit()));
                }
                if let Some(index) = index {
                    output.push_str(&format!("  [key: string]: {};\n", index.emit()));
                }
                output.push_str("};\n");
                output
            }
            TypeDefKind::TypeAlias { ty } => {
                format!("export type {} = {};\n", self.name, ty.emit())
            }
            TypeDefKind::ConstEnum { values, nullable } => {
                let mut output = format!("export const {} = {{\n", self.name);
                for (key, value) in values {
                    output.push_str(&format!("  {}: {},\n", key, value.emit()));
                }
                output.push_str("} as const;\n\n");
                let null = if *nullable { " | null" } else { "" };
                output.push_str(&format!(
                    "export type {name} = (typeof {name})[keyof typeof {name}]{null};\n",
                    name = self.name
                ));
                output
            }
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

fn member_access(object: &TsExpr, prop: &str, optional: bool) -> String {
    let dot = if optional { "?." } else { "." };
    if needs_bracket_notation(prop) {
        let bracket = if optional { "?." } else { "" };
        format!("{}{bracket}[\"{}\"]", object.emit(), escape_js_string(prop))
    } else {
        format!("{}{dot}{prop}", object.emit())
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call {
                callee,
                type_args,
                args,
            } => {
                let type_args = if type_args.is_empty() {
                    String::new()
                } else {
                    let list = type_args.iter().map(Emit::emit).collect::<Vec<_>>();
                    format!("<{}>", list.join(", "))
                };
                let args = args.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("{}{type_args}({args})", callee.emit())
            }
            TsExpr::Object(members) => {
                if members.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = members.iter().map(Emit::emit).collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            TsExpr::Member { object, prop } => member_access(object, prop, false),
            TsExpr::OptionalMember { object, prop } => member_access(object, prop, true),
            TsExpr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|p| match p {
                        TemplatePart::Static(s) => s.replace('`', "\\`").replace("${", "\\${"),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit()),
                    })
                    .collect();
                format!("`{content}`")
            }
            TsExpr::Array(items) => {
                let items = items.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
                format!("[{items}]")
            }
        }
    }
}

impl Emit for ObjectMember {
    fn emit(&self) -> String {
        match self {
            ObjectMember::Property(key, value) => {
                format!("{}: {}", quote_if_needed(key), value.emit())
            }
            ObjectMember::Spread(expr) => format!("...{}", expr.emit()),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        format!("{}{opt}: {}", self.name, self.ty.emit())
    }
}

// =============================================================================
// Statements and functions
// =============================================================================

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl TsStmt {
    /// Emit with specified indentation level (2 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::Return(e) => format!("{prefix}return {};\n", e.emit()),
        }
    }
}

fn emit_doc(doc: &str) -> String {
    let mut output = String::from("/**\n");
    for line in doc.lines() {
        let line = line.trim_end().replace("*/", "*\\/");
        if line.is_empty() {
            output.push_str(" *\n");
        } else {
            output.push_str(&format!(" * {line}\n"));
        }
    }
    output.push_str(" */\n");
    output
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let mut output = self.doc.as_deref().map(emit_doc).unwrap_or_default();

        let params_str = self.params.iter().map(Emit::emit).collect::<Vec<_>>().join(", ");
        output.push_str(&format!("export const {} = ({params_str}) => ", self.name));

        if self.body.is_empty() {
            output.push_str("{}");
        } else {
            output.push_str("{\n");
            for stmt in &self.body {
                output.push_str(&stmt.emit_indented(1));
            }
            output.push('}');
        }
        output.push_str(";\n");
        output
    }
}

// =============================================================================
// Module-level declarations
// =============================================================================

impl Emit for TsImport {
    fn emit(&self) -> String {
        let type_keyword = if self.type_only { "type " } else { "" };
        match &self.items {
            ImportItems::Named(names) => format!(
                "import {type_keyword}{{ {} }} from \"{}\";\n",
                names.join(", "),
                self.from
            ),
            ImportItems::Namespace(ns) => {
                format!("import {type_keyword}* as {ns} from \"{}\";\n", self.from)
            }
        }
    }
}

const VIEW_PROJECTIONS: &str = r#"export type ReadOnly<T> = { readonly $read: T };
export type WriteOnly<T> = { readonly $write: T };

export type InputView<T> =
  T extends ReadOnly<unknown>
    ? never
    : T extends WriteOnly<infer W>
      ? InputView<W>
      : T extends (infer E)[]
        ? InputView<E>[]
        : T extends object
          ? { [K in keyof T as NonNullable<T[K]> extends ReadOnly<unknown> ? never : K]: InputView<T[K]> }
          : T;

export type OutputView<T> =
  T extends WriteOnly<unknown>
    ? never
    : T extends ReadOnly<infer R>
      ? OutputView<R>
      : T extends (infer E)[]
        ? OutputView<E>[]
        : T extends object
          ? { [K in keyof T as NonNullable<T[K]> extends WriteOnly<unknown> ? never : K]: OutputView<T[K]> }
          : T;
"#;

const PICK: &str = r#"function pick(source: object, keys: readonly string[]): Record<string, unknown> {
  const out: Record<string, unknown> = {};
  for (const key of keys) {
    const value = (source as Record<string, unknown>)[key];
    if (value !== undefined) {
      out[key] = value;
    }
  }
  return out;
}
"#;

impl Emit for Helper {
    fn emit(&self) -> String {
        match self {
            Helper::ViewProjections => VIEW_PROJECTIONS.to_string(),
            Helper::Pick => PICK.to_string(),
        }
    }
}

impl Emit for TagGroup {
    fn emit(&self) -> String {
        let mut output = format!("export const {} = {{\n", self.name);
        for (key, callable) in &self.members {
            output.push_str(&format!("  {}: {callable},\n", quote_if_needed(key)));
        }
        output.push_str("} as const;\n");
        output
    }
}

impl Emit for Declaration {
    fn emit(&self) -> String {
        match self {
            Declaration::Import(import) => import.emit(),
            Declaration::Type(def) => def.emit(),
            Declaration::Helper(helper) => helper.emit(),
            Declaration::Callable(func) => func.emit(),
            Declaration::TagGroup(group) => group.emit(),
        }
    }
}

impl Emit for Artifact {
    fn emit(&self) -> String {
        let mut output = String::from(GENERATED_HEADER);
        let mut after_import = false;
        for decl in &self.declarations {
            let is_import = matches!(decl, Declaration::Import(_));
            if !(after_import && is_import) {
                output.push('\n');
            }
            output.push_str(&decl.emit());
            after_import = is_import;
        }
        output
    }
}

// =============================================================================
// Tests
// =============================================================================
