//! Target type representation and TypeScript declaration IR.
//!
//! This module defines:
//! - TypeNode: the mapped type tree produced from schema nodes
//! - ReferencedTypes: the set of named types a mapping touched
//! - TsExpr / TsStmt / TsFunction: the pieces a callable is built from
//! - Declaration / Artifact: the ordered records handed to a writer

use std::collections::BTreeSet;

/// Mapped type tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// Reference to a named type: "User", "Types.User"
    Named(String),
    /// Named generic application: InputView<User>, Promise<T>
    Generic {
        /// Generic type name
        name: String,
        /// Type arguments in order
        args: Vec<TypeNode>,
    },
    /// Array type: T[]
    ArrayOf(Box<TypeNode>),
    /// Object type with an optional index signature
    ObjectOf {
        /// Declared properties in document order
        properties: Vec<ObjectProperty>,
        /// Value type of `[key: string]: T`
        index: Option<Box<TypeNode>>,
    },
    /// Alternatives: A | B
    SumOf(Vec<TypeNode>),
    /// Conjunction: A & B
    ProductOf(Vec<TypeNode>),
    /// Closed set of literal values: "a" | "b"
    LiteralSet(Vec<TsLiteral>),
    /// Primitive types
    Primitive(PrimitiveType),
    /// T | null
    Nullable(Box<TypeNode>),
}

/// Primitive target types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// string
    String,
    /// number
    Number,
    /// number, declared as an integer
    Integer,
    /// boolean
    Boolean,
    /// null
    Null,
    /// any (degraded shapes)
    Any,
    /// unknown (opaque payloads)
    Unknown,
    /// void (no content)
    Void,
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    /// Key as declared; quoted on emission when needed
    pub name: String,
    /// Property type
    pub ty: TypeNode,
    /// Rendered with `?`
    pub optional: bool,
    /// Rendered with the `readonly` modifier
    pub readonly: bool,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// "text"
    String(String),
    /// 2.5
    Number(f64),
    /// 42
    Int(i64),
    /// true / false
    Bool(bool),
    /// null
    Null,
}

impl TypeNode {
    /// Shorthand for a primitive node.
    pub const fn primitive(kind: PrimitiveType) -> Self {
        Self::Primitive(kind)
    }

    /// Wrap in `Nullable` unless the type already admits null.
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_)
            | Self::Primitive(PrimitiveType::Null | PrimitiveType::Any | PrimitiveType::Unknown) => {
                self
            }
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Generic application with a single argument.
    pub fn generic(name: impl Into<String>, arg: TypeNode) -> Self {
        Self::Generic {
            name: name.into(),
            args: vec![arg],
        }
    }

    /// Combine alternatives; a single member is returned as is.
    pub fn sum(mut members: Vec<TypeNode>) -> Self {
        if members.len() == 1 {
            if let Some(only) = members.pop() {
                return only;
            }
        }
        Self::SumOf(members)
    }

    /// Combine conjuncts; a single member is returned as is.
    pub fn product(mut members: Vec<TypeNode>) -> Self {
        if members.len() == 1 {
            if let Some(only) = members.pop() {
                return only;
            }
        }
        Self::ProductOf(members)
    }
}

/// Named types touched while mapping, kept sorted for stable import lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencedTypes(BTreeSet<String>);

impl ReferencedTypes {
    /// Record one name.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    /// Union `other` into this set.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// True if `name` was recorded.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

// =============================================================================
// Expressions and statements
// =============================================================================

/// TypeScript expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    /// Identifier: foo
    Ident(String),
    /// Literal value: "bar", 42
    Literal(TsLiteral),
    /// Function call with optional type arguments: foo<T>(a, b)
    Call {
        /// Called expression
        callee: Box<TsExpr>,
        /// Explicit type arguments, omitted when empty
        type_args: Vec<TypeNode>,
        /// Call arguments
        args: Vec<TsExpr>,
    },
    /// Object literal: { a: 1, ...rest }
    Object(Vec<ObjectMember>),
    /// Member access: foo.bar or foo["bar-baz"]
    Member {
        /// Accessed object
        object: Box<TsExpr>,
        /// Property name, bracketed when not an identifier
        prop: String,
    },
    /// Optional member access: foo?.bar
    OptionalMember {
        /// Accessed object
        object: Box<TsExpr>,
        /// Property name, bracketed when not an identifier
        prop: String,
    },
    /// Template literal: `${foo}/bar`
    Template(Vec<TemplatePart>),
    /// Array literal: [a, b, c]
    Array(Vec<TsExpr>),
}

/// Entry in an object literal
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    /// key: value
    Property(String, TsExpr),
    /// ...expr
    Spread(TsExpr),
}

/// Template literal part
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Static string part
    Static(String),
    /// Dynamic expression part: ${expr}
    Dynamic(TsExpr),
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    /// Binding name
    pub name: String,
    /// Annotated type
    pub ty: TypeNode,
    /// Rendered with `?`
    pub optional: bool,
}

/// Statement in a function body
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    /// return expr;
    Return(TsExpr),
}

/// Exported arrow function: `export const name = (params) => { body };`
#[derive(Debug, Clone, PartialEq)]
pub struct TsFunction {
    /// Bound identifier
    pub name: String,
    /// Rendered as a JSDoc block above the declaration
    pub doc: Option<String>,
    /// Parameters in order
    pub params: Vec<TsParam>,
    /// Statements of the block body
    pub body: Vec<TsStmt>,
}

// =============================================================================
// Module-level IR
// =============================================================================

/// Import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsImport {
    /// Items to import
    pub items: ImportItems,
    /// Module path
    pub from: String,
    /// Whether this is a type-only import
    pub type_only: bool,
}

/// What an import binds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportItems {
    /// import { a, b } from "..."
    Named(Vec<String>),
    /// import * as ns from "..."
    Namespace(String),
}

/// Type definition kind
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// type Foo = ...
    TypeAlias {
        /// Aliased type
        ty: TypeNode,
    },
    /// const Foo = { ... } as const; type Foo = ...
    ConstEnum {
        /// (key, value) entries of the const object
        values: Vec<(String, TsLiteral)>,
        /// Derived type also admits null
        nullable: bool,
    },
}

/// Type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    /// Declared identifier
    pub name: String,
    /// Declaration shape
    pub kind: TypeDefKind,
}

/// Fixed helper blocks emitted at most once per artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    /// `ReadOnly` / `WriteOnly` markers and the `InputView` / `OutputView` projections
    ViewProjections,
    /// `pick(source, keys)` used to derive header and query objects
    Pick,
}

/// A read-only grouping of callables under one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    /// PascalCase tag identifier
    pub name: String,
    /// (exposed key, callable identifier)
    pub members: Vec<(String, String)>,
}

/// One top-level record of an artifact
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// import ... from "..."
    Import(TsImport),
    /// Type alias or enumeration
    Type(TsTypeDef),
    /// Fixed helper block
    Helper(Helper),
    /// Generated operation callable
    Callable(TsFunction),
    /// Per-tag grouping object
    TagGroup(TagGroup),
}

/// Ordered declarations of one generated file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifact {
    /// Records in emission order
    pub declarations: Vec<Declaration>,
}

impl Artifact {
    /// Type definitions in declaration order.
    pub fn type_defs(&self) -> impl Iterator<Item = &TsTypeDef> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Type(def) => Some(def),
            _ => None,
        })
    }

    /// Callables in declaration order.
    pub fn callables(&self) -> impl Iterator<Item = &TsFunction> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Callable(func) => Some(func),
            _ => None,
        })
    }

    /// Tag groupings in declaration order.
    pub fn tag_groups(&self) -> impl Iterator<Item = &TagGroup> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::TagGroup(group) => Some(group),
            _ => None,
        })
    }
}
