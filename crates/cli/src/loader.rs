//! Reading the OpenAPI document and the generator configuration from disk.

use std::fs;
use std::path::Path;

use tracing::debug;
use tsgen_core::{GeneratorConfig, OpenApiSpec};

/// Load an OpenAPI document.
///
/// `.yaml` / `.yml` files are parsed as YAML. Anything else is parsed as JSON,
/// falling back to YAML when that fails.
pub fn load_spec(path: &Path) -> Result<OpenApiSpec, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    debug!(path = %path.display(), bytes = text.len(), is_yaml, "Loading OpenAPI document.");

    let parsed = if is_yaml {
        OpenApiSpec::from_yaml(&text)
    } else {
        OpenApiSpec::from_json(&text).or_else(|json_err| {
            debug!(error = %json_err, "JSON parse failed, retrying as YAML.");
            OpenApiSpec::from_yaml(&text).map_err(|_| json_err)
        })
    };
    parsed.map_err(|err| format!("{}: {err}", path.display()))
}

/// Load a generator configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GeneratorConfig, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config {}: {err}", path.display()))?;
    toml::from_str(&text)
        .map_err(|err| format!("Invalid config {}: {err}", path.display()))
}
