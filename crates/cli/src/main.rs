//! `tsgen`: generate a TypeScript type library and tagged client from an
//! OpenAPI document.

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use tsgen_core::{GeneratorConfig, Severity, generate};

mod loader;
mod writer;

use writer::{ArtifactWriter, CLIENT_FILE, FsWriter};

#[derive(Parser, Debug)]
#[command(
    name = "tsgen",
    version,
    about = "Generate a TypeScript type library and tagged client from an OpenAPI document"
)]
struct Cli {
    /// OpenAPI document (JSON or YAML)
    #[arg(value_name = "SPEC")]
    spec: PathBuf,

    /// Directory receiving types.ts and client.ts
    #[arg(long, short, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// TOML file with generator options
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Strip the tag text from method names inside tag groupings
    #[arg(long)]
    remove_tag_from_operation_id: bool,

    /// Emit input/output views for readOnly and writeOnly properties
    #[arg(long)]
    add_readonly_writeonly_modifiers: bool,

    /// Import the type library as a namespace with this name
    #[arg(long, value_name = "NS")]
    types_namespace: Option<String>,

    /// Generate without writing any files
    #[arg(long)]
    check: bool,
}

impl Cli {
    /// File configuration with command line flags applied on top.
    fn generator_config(&self) -> Result<GeneratorConfig, String> {
        let mut config = match &self.config {
            Some(path) => loader::load_config(path)?,
            None => GeneratorConfig::default(),
        };
        if self.remove_tag_from_operation_id {
            config.remove_tag_from_operation_id = true;
        }
        if self.add_readonly_writeonly_modifiers {
            config.add_readonly_writeonly_modifiers = true;
        }
        if let Some(ns) = &self.types_namespace {
            config.types_namespace = Some(ns.clone());
        }
        Ok(config)
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = cli.generator_config()?;
    debug!(?config, "Resolved generator config.");

    let spec = loader::load_spec(&cli.spec)?;
    let generation = generate(&spec, &config);

    for diagnostic in &generation.diagnostics {
        eprintln!("{diagnostic}");
    }
    let skipped = generation
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();

    if cli.check {
        info!(skipped, "Check finished.");
    } else {
        let written = FsWriter::new(&cli.out).write(&generation)?;
        for path in &written {
            println!("wrote {}", path.display());
        }
        info!(files = written.len(), skipped, "Generation complete.");
    }

    if let Err(err) = &generation.client {
        return Err(format!("{CLIENT_FILE} not generated: {err}"));
    }
    Ok(())
}

fn init_tracing() {
    // TSGEN_LOG controls log level: "trace", "debug", "info", "warn", "error"
    // or a full tracing filter spec like "tsgen_core=debug"
    let filter = match std::env::var("TSGEN_LOG") {
        Ok(level) if is_plain_level(&level) => format!("tsgen={level},tsgen_core={level}"),
        Ok(spec) => spec,
        Err(_) => "tsgen=warn,tsgen_core=warn".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let code = match run(&cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("tsgen.toml");
        std::fs::write(&config_path, "typesNamespace = \"FromFile\"\ntypesModule = \"../types\"\n")
            .unwrap();

        let cli = Cli::parse_from([
            "tsgen",
            "openapi.json",
            "--config",
            config_path.to_str().unwrap(),
            "--types-namespace",
            "FromFlag",
            "--remove-tag-from-operation-id",
        ]);
        let config = cli.generator_config().unwrap();
        assert_eq!(config.types_namespace.as_deref(), Some("FromFlag"));
        assert_eq!(config.types_module, "../types");
        assert!(config.remove_tag_from_operation_id);
        assert!(!config.add_readonly_writeonly_modifiers);
    }

    #[test]
    fn test_plain_levels() {
        assert!(is_plain_level("DEBUG"));
        assert!(!is_plain_level("tsgen_core=trace"));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
