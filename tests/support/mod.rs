use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Exit status plus captured streams of a finished command.
pub struct Finished {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Run `cmd` without treating a nonzero exit as an error.
pub fn run_to_completion(mut cmd: Command) -> Result<Finished> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    let Some(code) = output.status.code() else {
        bail!("command {:?} terminated by signal", cmd);
    };
    Ok(Finished {
        code,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

/// A minimal 1.1 catalog that the fixture schema accepts.
pub fn v1_catalog() -> Value {
    json!({
        "conformsTo": "https://project-open-data.cio.gov/v1.1/schema",
        "title": "Agency Catalog",
        "dataset": [{
            "identifier": "air-quality",
            "title": "Air Quality",
            "description": "Hourly readings",
            "modified": "2024-01-15",
            "contactPoint": {"fn": "Data Desk", "hasEmail": "data@example.gov"},
            "publisher": {"name": "Agency X"},
            "distribution": [{"downloadURL": "https://example.gov/aq.csv", "mediaType": "text/csv"}]
        }]
    })
}

/// Lay down a schema root with 1.1 and 3.0 schemas shaped like the real
/// ones: cross-file `$ref`s, pointer refs, and `$id`s.
pub fn schema_root(root: &Path) -> Result<()> {
    let v1 = root.join("dcat-us1.1");
    write_json(
        &v1.join("catalog.json"),
        &json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["dataset"],
            "properties": {
                "dataset": {"type": "array", "items": {"$ref": "dataset.json"}}
            }
        }),
    )?;
    write_json(
        &v1.join("dataset.json"),
        &json!({
            "type": "object",
            "required": ["title", "identifier"],
            "properties": {"contactPoint": {"$ref": "#/definitions/vcard"}},
            "definitions": {"vcard": {"type": "object", "required": ["fn"]}}
        }),
    )?;
    fs::create_dir_all(v1.join("examples"))?;

    let jsonschema = root.join("dcat-us3").join("jsonschema");
    write_json(
        &jsonschema.join("dcat_us_3.0.0_schema.json"),
        &json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "definitions": {
                "Catalog": {"$ref": "definitions/Catalog.json"},
                "Dataset": {"$ref": "definitions/Dataset.json"}
            }
        }),
    )?;
    write_json(
        &jsonschema.join("definitions").join("Catalog.json"),
        &json!({
            "$id": "https://example.org/dcat-us3/Catalog.json",
            "title": "Catalog",
            "type": "object",
            "required": ["@context", "dcterms:title"],
            "properties": {
                "dcat:dataset": {"type": "array", "items": {"$ref": "Dataset.json"}}
            }
        }),
    )?;
    write_json(
        &jsonschema.join("definitions").join("Dataset.json"),
        &json!({
            "$id": "https://example.org/dcat-us3/Dataset.json",
            "type": "object",
            "required": ["dcterms:title"],
            "properties": {"dcterms:publisher": {"$ref": "#/definitions/agent"}},
            "definitions": {"agent": {"type": "object", "required": ["foaf:name"]}}
        }),
    )?;
    fs::create_dir_all(root.join("dcat-us3").join("examples"))?;
    Ok(())
}

/// Install a stand-in `pyshacl` that fails documents containing `"bad"`.
pub fn fake_pyshacl(dir: &Path) -> Result<PathBuf> {
    let script = dir.join("pyshacl");
    fs::write(
        &script,
        r#"#!/bin/sh
for last; do :; done
if grep -q '"bad"' "$last"; then
  echo "Validation Report"
  echo "Conforms: False"
  echo "Results (1):"
  echo "Constraint Violation in MinCountConstraintComponent (http://www.w3.org/ns/shacl#MinCountConstraintComponent):"
  echo "	Severity: sh:Violation"
  echo "	Focus Node: <https://example.org/catalog>"
  echo "	Result Path: dcterms:title"
  exit 1
fi
if grep -q '"explode"' "$last"; then
  echo "rdflib parse failure" >&2
  exit 2
fi
echo "Validation Report"
echo "Conforms: True"
exit 0
"#,
    )?;
    make_executable(&script)?;
    Ok(script)
}
