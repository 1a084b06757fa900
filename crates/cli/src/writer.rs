//! Artifact persistence.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};
use tsgen_core::Generation;

/// File name of the type library.
pub const TYPES_FILE: &str = "types.ts";
/// File name of the tagged client.
pub const CLIENT_FILE: &str = "client.ts";

/// Destination for generated artifacts.
pub trait ArtifactWriter {
    /// Persist every artifact that was produced, returning the paths written.
    fn write(&self, generation: &Generation) -> Result<Vec<PathBuf>, String>;
}

/// Writes `types.ts` and `client.ts` into a directory.
#[derive(Debug, Clone)]
pub struct FsWriter {
    out_dir: PathBuf,
}

impl FsWriter {
    /// Writer targeting `out_dir`, created on first write.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf, String> {
        let path = self.out_dir.join(name);
        fs::write(&path, contents)
            .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
        debug!(path = %path.display(), bytes = contents.len(), "Wrote artifact.");
        Ok(path)
    }
}

impl ArtifactWriter for FsWriter {
    fn write(&self, generation: &Generation) -> Result<Vec<PathBuf>, String> {
        fs::create_dir_all(&self.out_dir).map_err(|err| {
            format!(
                "Failed to create output directory {}: {err}",
                self.out_dir.display()
            )
        })?;

        let mut written = vec![self.write_file(TYPES_FILE, &generation.types_source())?];
        match generation.client_source() {
            Ok(source) => written.push(self.write_file(CLIENT_FILE, &source)?),
            Err(err) => warn!(error = %err, "Skipping {CLIENT_FILE}."),
        }
        Ok(written)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tsgen_core::{GeneratorConfig, generate_from_str};

    #[test]
    fn test_fs_writer_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("src").join("api");
        let generation = generate_from_str(
            r#"{ "paths": {}, "components": { "schemas": { "Id": { "type": "string" } } } }"#,
            &GeneratorConfig::default(),
        )
        .unwrap();

        let written = FsWriter::new(&out).write(&generation).unwrap();
        assert_eq!(written, [out.join(TYPES_FILE), out.join(CLIENT_FILE)]);

        let types = fs::read_to_string(out.join(TYPES_FILE)).unwrap();
        assert!(types.contains("export type Id = string;"));
        let client = fs::read_to_string(out.join(CLIENT_FILE)).unwrap();
        assert!(client.contains("import { request } from \"./transport\";"));
    }

    #[test]
    fn test_failed_client_still_writes_types() {
        let dir = tempfile::tempdir().unwrap();
        let generation = generate_from_str(
            r#"{
              "paths": {
                "/a": { "get": { "operationId": "list", "responses": { "200": { "description": "ok" } } } },
                "/b": { "get": { "operationId": "list", "responses": { "200": { "description": "ok" } } } }
              },
              "components": { "schemas": { "Id": { "type": "string" } } }
            }"#,
            &GeneratorConfig::default(),
        )
        .unwrap();
        assert!(generation.client.is_err());

        let written = FsWriter::new(dir.path()).write(&generation).unwrap();
        assert_eq!(written, [dir.path().join(TYPES_FILE)]);
        assert!(!dir.path().join(CLIENT_FILE).exists());
    }
}
