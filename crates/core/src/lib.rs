//! OpenAPI to TypeScript code generator.
//!
//! This crate parses OpenAPI 3.0 / 3.1 documents (JSON or YAML) and generates
//! two TypeScript artifacts:
//! - a type library with one declaration per component schema
//! - a client with one callable per operation, grouped by tag
//!
//! ```
//! use tsgen_core::{GeneratorConfig, generate_from_str};
//!
//! let generation = generate_from_str(
//!     r#"{ "paths": { "/ping": { "get": { "operationId": "ping", "responses": { "204": { "description": "ok" } } } } } }"#,
//!     &GeneratorConfig::default(),
//! )?;
//! assert!(generation.types_source().starts_with("// Generated by tsgen"));
//! assert!(generation.client_source()?.contains("export const Default = {"));
//! # Ok::<(), tsgen_core::GenerateError>(())
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod ir;
pub mod spec;

pub use config::GeneratorConfig;
pub use emitter::{Generation, generate, generate_from_str};
pub use error::{AnalyzeError, Diagnostic, GenerateError, ResolveError, Severity};
pub use spec::OpenApiSpec;
