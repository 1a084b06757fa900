//! Intermediate Representation for OpenAPI to TypeScript code generation.
//!
//! The pipeline has four stages, each feeding the next:
//! 1. Resolve: named references, enumeration detection, identifier sanitizing
//! 2. Map: schema nodes to `TypeNode` trees (view-aware, pure)
//! 3. Analyze: path items to `AnalyzedOperation` records
//! 4. Synthesize: type library and client `Artifact`s
//!
//! Emission of artifacts to TypeScript text is purely mechanical (`Emit`).
//!
//! ## Module Structure
//!
//! - `resolve`: Schema Resolver
//! - `mapper`: Type Mapper
//! - `normalize`: Operation Analyzer
//! - `codegen`: Client Synthesizer
//! - `types`: TypeNode and the TypeScript declaration IR
//! - `api`: AnalyzedOperation and friends
//! - `emit`: IR -> code strings (via Emit trait)
//! - `utils`: Common utilities shared across modules

mod api;
mod codegen;
mod emit;
mod mapper;
mod normalize;
mod resolve;
mod types;
pub mod utils;

pub use api::{
    AnalyzedOperation, BodyIR, HttpMethod, ParamIR, ParamLocation, PathPart, PathTemplate,
    ResponseIR, ResponseKind,
};
pub use codegen::{TypeLibrary, callable_name, exposed_name, synthesize_client, synthesize_types};
pub use emit::{Emit, GENERATED_HEADER};
pub use mapper::{
    DATE_TIME, INPUT_VIEW, MapContext, Mapped, OUTPUT_VIEW, READ_ONLY, ViewFilter, WRITE_ONLY,
    map_schema,
};
pub use normalize::{
    Analysis, DEFAULT_TAG, analyze_spec, method_name, synthesize_operation_id, tag_name,
};
pub use resolve::{SchemaResolver, sanitize_identifier, sanitize_type_name};
pub use types::{
    Artifact, Declaration, Helper, ImportItems, ObjectMember, ObjectProperty, PrimitiveType,
    ReferencedTypes, TagGroup, TemplatePart, TsExpr, TsFunction, TsImport, TsLiteral, TsParam,
    TsStmt, TsTypeDef, TypeDefKind, TypeNode,
};
