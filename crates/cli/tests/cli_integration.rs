//! End-to-end tests that run the built `tsgen` binary against documents in a temp dir.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const PETSTORE: &str = r##"{
  "openapi": "3.0.3",
  "paths": {
    "/pets": {
      "get": {
        "operationId": "petList",
        "tags": ["Pet"],
        "parameters": [{ "name": "limit", "in": "query", "schema": { "type": "integer" } }],
        "responses": {
          "200": { "description": "ok", "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } } } } }
        }
      }
    },
    "/pets/{petId}": {
      "delete": {
        "operationId": "petRemove",
        "tags": ["Pet"],
        "responses": { "204": { "description": "gone" } }
      }
    }
  },
  "components": {
    "schemas": {
      "Pet": {
        "type": "object",
        "required": ["name"],
        "properties": {
          "id": { "type": "integer", "readOnly": true },
          "name": { "type": "string" },
          "kind": { "type": "string", "enum": ["cat", "dog"] }
        }
      }
    }
  }
}"##;

fn tsgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tsgen"))
        .args(args)
        .env("TSGEN_LOG", "error")
        .output()
        .expect("failed to run tsgen")
}

fn write_spec(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_generates_both_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), "openapi.json", PETSTORE);
    let out = dir.path().join("generated");

    let output = tsgen(&[&spec, "--out", out.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let types = fs::read_to_string(out.join("types.ts")).unwrap();
    assert!(types.contains("export type Pet = {"));
    assert!(types.contains("  kind?: \"cat\" | \"dog\";"));

    let client = fs::read_to_string(out.join("client.ts")).unwrap();
    assert!(client.contains("export const petPetList = (params: { limit?: number }, options?: TransportOptions) => {"));
    assert!(client.contains("url: `/pets/${encodeURIComponent(String(params.petId))}`"));
    assert!(client.contains("export const Pet = {\n  petList: petPetList,\n  petRemove: petPetRemove,\n} as const;"));
}

#[test]
fn test_flags_reach_the_generator() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), "openapi.json", PETSTORE);
    let out = dir.path().join("generated");

    let output = tsgen(&[
        &spec,
        "--out",
        out.to_str().unwrap(),
        "--remove-tag-from-operation-id",
        "--add-readonly-writeonly-modifiers",
        "--types-namespace",
        "Api",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let types = fs::read_to_string(out.join("types.ts")).unwrap();
    assert!(types.contains("export type OutputView<T> ="));
    assert!(types.contains("  readonly id?: ReadOnly<number>;"));

    let client = fs::read_to_string(out.join("client.ts")).unwrap();
    assert!(client.contains("import type * as Api from \"./types\";"));
    assert!(client.contains("request<Api.OutputView<Api.Pet>[]>("));
    assert!(client.contains("  List: petPetList,\n  Remove: petPetRemove,\n"));
}

#[test]
fn test_config_file_and_yaml_input() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "openapi.yaml",
        "paths:\n  /ping:\n    get:\n      operationId: ping\n      responses:\n        '204':\n          description: ok\n",
    );
    let config = write_spec(dir.path(), "tsgen.toml", "transportModule = \"@acme/http\"\n");
    let out = dir.path().join("generated");

    let output = tsgen(&[&spec, "--out", out.to_str().unwrap(), "--config", &config]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let client = fs::read_to_string(out.join("client.ts")).unwrap();
    assert!(client.contains("import { request } from \"@acme/http\";"));
    assert!(client.contains("export const Default = {\n  ping: defaultPing,\n} as const;"));
}

#[test]
fn test_check_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), "openapi.json", PETSTORE);
    let out = dir.path().join("generated");

    let output = tsgen(&[&spec, "--out", out.to_str().unwrap(), "--check"]);
    assert!(output.status.success());
    assert!(!out.exists());
}

#[test]
fn test_duplicate_method_name_fails() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "openapi.json",
        r#"{
          "paths": {
            "/a": { "get": { "operationId": "list", "tags": ["T"], "responses": { "200": { "description": "ok" } } } },
            "/b": { "get": { "operationId": "list", "tags": ["T"], "responses": { "200": { "description": "ok" } } } }
          }
        }"#,
    );

    let output = tsgen(&[&spec, "--check"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Duplicate method name 'list' in tag 'T'"), "stderr: {stderr}");
}

#[test]
fn test_duplicate_method_name_still_writes_types() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "openapi.json",
        r#"{
          "paths": {
            "/a": { "get": { "operationId": "list", "tags": ["T"], "responses": { "200": { "description": "ok" } } } },
            "/b": { "get": { "operationId": "list", "tags": ["T"], "responses": { "200": { "description": "ok" } } } }
          },
          "components": { "schemas": { "Id": { "type": "string" } } }
        }"#,
    );
    let out = dir.path().join("generated");

    let output = tsgen(&[&spec, "--out", out.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("client.ts not generated"), "stderr: {stderr}");

    let types = fs::read_to_string(out.join("types.ts")).unwrap();
    assert!(types.contains("export type Id = string;"));
    assert!(!out.join("client.ts").exists());
}

#[test]
fn test_config_can_disable_path_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), "openapi.json", PETSTORE);
    let config = write_spec(dir.path(), "tsgen.toml", "encodePathParams = false\n");
    let out = dir.path().join("generated");

    let output = tsgen(&[&spec, "--out", out.to_str().unwrap(), "--config", &config]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let client = fs::read_to_string(out.join("client.ts")).unwrap();
    assert!(client.contains("url: `/pets/${String(params.petId)}`"), "client:\n{client}");
}

#[test]
fn test_skipped_schema_is_reported_but_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(
        dir.path(),
        "openapi.json",
        r##"{
          "paths": {},
          "components": { "schemas": { "Broken": { "$ref": "#/components/schemas/Missing" } } }
        }"##,
    );
    let out = dir.path().join("generated");

    let output = tsgen(&[&spec, "--out", out.to_str().unwrap()]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: #/components/schemas/Broken"), "stderr: {stderr}");
    assert!(out.join("types.ts").exists());
}

#[test]
fn test_unreadable_document_fails() {
    let dir = tempfile::tempdir().unwrap();
    let spec = write_spec(dir.path(), "openapi.json", "{ \"paths\": 42 }");

    let output = tsgen(&[&spec, "--check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse OpenAPI document"));
}
