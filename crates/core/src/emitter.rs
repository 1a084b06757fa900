//! Generation pipeline entry points.
//!
//! The pipeline is:
//! 1. Parse: OpenAPI JSON / YAML -> OpenApiSpec
//! 2. Analyze: OpenApiSpec -> AnalyzedOperation records
//! 3. Synthesize: schema library + operations -> type library and client artifacts
//! 4. Emit: Artifact -> String (via Emit trait)

use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::error::{Diagnostic, GenerateError, Severity};
use crate::ir::{
    Artifact, Emit, SchemaResolver, analyze_spec, synthesize_client, synthesize_types,
};
use crate::spec::OpenApiSpec;

/// Output of one generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The type library (`types.ts`)
    pub types: Artifact,
    /// The tagged client (`client.ts`), or why it could not be produced
    pub client: Result<Artifact, GenerateError>,
    /// Everything that was degraded or skipped, in pipeline order
    pub diagnostics: Vec<Diagnostic>,
}

impl Generation {
    /// Rendered `types.ts`.
    pub fn types_source(&self) -> String {
        self.types.emit()
    }

    /// Rendered `client.ts`, or the error that failed the client artifact.
    pub fn client_source(&self) -> Result<String, GenerateError> {
        self.client.as_ref().map(Emit::emit).map_err(Clone::clone)
    }

    /// True if any declaration or operation was skipped or the client failed.
    pub fn has_errors(&self) -> bool {
        self.client.is_err()
            || self
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Error)
    }
}

/// Generate the type library and client for a parsed document.
///
/// The type library is always produced. A duplicate method name fails only
/// the client, which is then carried as `Err` in [`Generation::client`].
pub fn generate(spec: &OpenApiSpec, config: &GeneratorConfig) -> Generation {
    let resolver = SchemaResolver::new(&spec.components.schemas);

    let analysis = analyze_spec(spec, &resolver, config);
    debug!(
        operations = analysis.operations.len(),
        skipped = analysis.diagnostics.len(),
        "analyzed document"
    );

    let library = synthesize_types(spec, &resolver, config, &analysis.referenced());

    let mut diagnostics = library.diagnostics;
    diagnostics.extend(analysis.diagnostics);
    let client = match synthesize_client(&analysis.operations, config, &library.declared) {
        Ok((client, client_diagnostics)) => {
            diagnostics.extend(client_diagnostics);
            Ok(client)
        }
        Err(err) => {
            warn!(error = %err, "client artifact failed");
            Err(err)
        }
    };

    info!(
        types = library.artifact.type_defs().count(),
        callables = client.as_ref().map_or(0, |c| c.callables().count()),
        tag_groups = client.as_ref().map_or(0, |c| c.tag_groups().count()),
        diagnostics = diagnostics.len(),
        "generation finished"
    );

    Generation {
        types: library.artifact,
        client,
        diagnostics,
    }
}

/// Parse JSON or YAML text and generate.
///
/// Fails only when the text is not a readable document.
pub fn generate_from_str(
    text: &str,
    config: &GeneratorConfig,
) -> Result<Generation, GenerateError> {
    let spec = OpenApiSpec::parse(text)?;
    Ok(generate(&spec, config))
}
