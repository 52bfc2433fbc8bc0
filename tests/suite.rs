#![cfg(unix)]

mod support;

use anyhow::Result;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::process::Command;
use support::{
    fake_pyshacl, run_command, run_to_completion, schema_root, v1_catalog, write_json,
};
use tempfile::TempDir;

const CONVERT: &str = env!("CARGO_BIN_EXE_dcat-us-convert");
const VALIDATE_V1: &str = env!("CARGO_BIN_EXE_validate-dcat-us1");
const VALIDATE_V3: &str = env!("CARGO_BIN_EXE_validate-dcat-us3");
const VALIDATE_SHACL: &str = env!("CARGO_BIN_EXE_validate-dcat-us3-shacl");
const COMBINE: &str = env!("CARGO_BIN_EXE_combine-dcat-us3-schema");

fn with_root(program: &str, root: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.env_remove("DCAT_US_ROOT")
        .env_remove("DCAT_US_PYSHACL")
        .env("RUST_LOG", "off")
        .arg("--root")
        .arg(root);
    cmd
}

fn read_json(path: &Path) -> Result<Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

#[test]
fn convert_single_file_uses_default_output_name() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("agency.json");
    write_json(&input, &v1_catalog())?;

    let mut cmd = Command::new(CONVERT);
    cmd.arg(&input);
    let output = run_command(cmd)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Successfully converted"));

    let converted = read_json(&dir.path().join("agency-v3.jsonld"))?;
    assert_eq!(converted["dcterms:title"], "Agency Catalog");
    let dataset = &converted["dcat:dataset"][0];
    assert_eq!(dataset["@id"], "https://data.gov/datasets/air-quality");
    assert_eq!(
        dataset["dcat:contactPoint"]["vcard:hasEmail"],
        json!({"@id": "mailto:data@example.gov"})
    );
    assert_eq!(
        dataset["dcterms:modified"],
        json!({"@type": "xsd:date", "@value": "2024-01-15"})
    );
    Ok(())
}

#[test]
fn convert_reports_unreadable_input() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("broken.json");
    fs::write(&input, "{ nope")?;

    let mut cmd = Command::new(CONVERT);
    cmd.arg(&input).arg("-o").arg(dir.path().join("out.jsonld"));
    let finished = run_to_completion(cmd)?;
    assert_eq!(finished.code, 1);
    assert!(finished.stdout.contains("Error converting"));
    assert!(!dir.path().join("out.jsonld").exists());
    Ok(())
}

#[test]
fn convert_batch_counts_failures() -> Result<()> {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    write_json(&input.path().join("good.json"), &v1_catalog())?;
    fs::write(input.path().join("bad.json"), "[")?;
    fs::write(input.path().join("readme.md"), "ignored")?;

    let mut cmd = Command::new(CONVERT);
    cmd.env("RUST_LOG", "off")
        .arg(input.path())
        .arg("--batch")
        .arg("--output")
        .arg(output.path());
    let finished = run_to_completion(cmd)?;
    assert_eq!(finished.code, 1);
    assert!(
        finished
            .stdout
            .contains("Batch conversion completed: 1/2 files converted successfully")
    );
    assert!(output.path().join("good-v3.jsonld").is_file());
    assert!(!output.path().join("bad-v3.jsonld").exists());
    Ok(())
}

#[test]
fn convert_logs_unmapped_fields_to_stderr() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("extra.json");
    write_json(
        &input,
        &json!({"dataset": [{"identifier": "a", "title": "A", "fooBar": "baz"}]}),
    )?;

    let mut cmd = Command::new(CONVERT);
    cmd.env("RUST_LOG", "dcat_us=warn").arg(&input);
    let finished = run_to_completion(cmd)?;
    assert_eq!(finished.code, 0);
    assert!(finished.stderr.contains("fooBar"));
    assert!(!finished.stdout.contains("fooBar"));
    let converted = read_json(&dir.path().join("extra-v3.jsonld"))?;
    assert!(converted["dcat:dataset"][0].get("fooBar").is_none());
    Ok(())
}

#[test]
fn convert_writes_warnings_report_for_batch() -> Result<()> {
    let input = TempDir::new()?;
    write_json(
        &input.path().join("a.json"),
        &json!({"dataset": [{"identifier": "a", "fooBar": 1, "modified": "R/P1D"}]}),
    )?;
    write_json(&input.path().join("b.json"), &json!({"title": "clean"}))?;
    let report_path = input.path().join("warnings.report");

    let mut cmd = Command::new(CONVERT);
    cmd.env("RUST_LOG", "off")
        .arg(input.path())
        .arg("--warnings-json")
        .arg(&report_path);
    run_command(cmd)?;

    let report = read_json(&report_path)?;
    let entries = report.as_array().expect("report is an array");
    assert_eq!(entries.len(), 2);
    let fields: Vec<&str> = entries[0]["warnings"]
        .as_array()
        .expect("warnings array")
        .iter()
        .filter_map(|w| w["field"].as_str())
        .collect();
    assert_eq!(fields, ["fooBar", "modified"]);
    assert_eq!(entries[0]["warnings"][1]["reason"]["kind"], "duration_as_date");
    assert_eq!(entries[1]["warnings"], json!([]));
    Ok(())
}

#[test]
fn v1_validator_runs_examples_and_single_files() -> Result<()> {
    let root = TempDir::new()?;
    schema_root(root.path())?;
    let examples = root.path().join("dcat-us1.1").join("examples");
    write_json(&examples.join("good.json"), &v1_catalog())?;
    write_json(
        &examples.join("missing-fn.json"),
        &json!({"dataset": [{"title": "T", "identifier": "x", "contactPoint": {}}]}),
    )?;

    let finished = run_to_completion(with_root(VALIDATE_V1, root.path()))?;
    assert_eq!(finished.code, 1, "stdout: {}", finished.stdout);
    assert!(finished.stdout.contains("SUCCESS: good.json conforms to DCAT-US 1.1 JSON Schema"));
    assert!(finished.stdout.contains("FAILURE: missing-fn.json does not conform"));
    assert!(finished.stdout.contains("Path: dataset -> 0 -> contactPoint"));
    assert!(finished.stdout.contains("Total files processed: 2"));

    let mut single = with_root(VALIDATE_V1, root.path());
    single.arg(examples.join("good.json"));
    let output = run_command(single)?;
    assert!(String::from_utf8_lossy(&output.stdout).contains("VALIDATION RESULTS FOR"));
    Ok(())
}

#[test]
fn converted_catalog_passes_v3_schema() -> Result<()> {
    let root = TempDir::new()?;
    schema_root(root.path())?;
    let source = root.path().join("agency.json");
    write_json(&source, &v1_catalog())?;
    let examples = root.path().join("dcat-us3").join("examples");

    let mut convert = Command::new(CONVERT);
    convert
        .arg(&source)
        .arg("-o")
        .arg(examples.join("agency.jsonld"));
    run_command(convert)?;

    let output = run_command(with_root(VALIDATE_V3, root.path()))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SUCCESS: agency.jsonld conforms to DCAT-US 3.0 JSON Schema"));
    assert!(stdout.contains("All validations passed successfully"));

    write_json(
        &examples.join("untitled.json"),
        &json!({"@context": {}, "dcat:dataset": [{"dcterms:title": "x"}]}),
    )?;
    let finished = run_to_completion(with_root(VALIDATE_V3, root.path()))?;
    assert_eq!(finished.code, 1);
    assert!(finished.stdout.contains("FAILURE: untitled.json"));
    assert!(finished.stdout.contains("Failed validations: 1"));
    Ok(())
}

#[test]
fn v3_validator_exit_codes_for_example_directory() -> Result<()> {
    let root = TempDir::new()?;
    schema_root(root.path())?;

    let empty = run_to_completion(with_root(VALIDATE_V3, root.path()))?;
    assert_eq!(empty.code, 0);
    assert!(empty.stdout.contains("WARNING"));

    fs::remove_dir(root.path().join("dcat-us3").join("examples"))?;
    let missing = run_to_completion(with_root(VALIDATE_V3, root.path()))?;
    assert_eq!(missing.code, 1);
    assert!(missing.stdout.contains("Examples directory not found"));
    Ok(())
}

#[test]
fn shacl_validator_drives_pyshacl() -> Result<()> {
    let root = TempDir::new()?;
    schema_root(root.path())?;
    let tools = TempDir::new()?;
    let pyshacl = fake_pyshacl(tools.path())?;
    let shapes = root.path().join("dcat-us3").join("dcat-us_3.0_shacl_shapes.ttl");
    fs::write(&shapes, "@prefix sh: <http://www.w3.org/ns/shacl#> .\n")?;
    let examples = root.path().join("dcat-us3").join("examples");
    write_json(&examples.join("a-good.jsonld"), &json!({"dcterms:title": "ok"}))?;
    write_json(&examples.join("b-bad.jsonld"), &json!({"dcterms:title": "bad"}))?;
    write_json(&examples.join("c-explode.json"), &json!({"dcterms:title": "explode"}))?;

    let mut cmd = with_root(VALIDATE_SHACL, root.path());
    cmd.arg("--pyshacl").arg(&pyshacl);
    let finished = run_to_completion(cmd)?;
    assert_eq!(finished.code, 1, "stdout: {}", finished.stdout);
    let stdout = &finished.stdout;
    assert!(stdout.contains("SUCCESS: a-good.jsonld conforms to DCAT-US 3.0 SHACL shapes"));
    assert!(stdout.contains("FAILURE: b-bad.jsonld does not conform"));
    assert!(stdout.contains("Specific Violations Summary (1 total):"));
    assert!(stdout.contains("1. Constraint Violation in MinCountConstraintComponent"));
    assert!(stdout.contains("ERROR: Failed to validate c-explode.json"));
    assert!(stdout.contains("Successful validations: 1"));
    assert!(stdout.contains("Failed validations: 2"));

    let mut single = with_root(VALIDATE_SHACL, root.path());
    single.arg("--pyshacl").arg(&pyshacl).arg(examples.join("a-good.jsonld"));
    run_command(single)?;
    Ok(())
}

#[test]
fn shacl_validator_setup_exit_codes() -> Result<()> {
    let root = TempDir::new()?;
    schema_root(root.path())?;
    let tools = TempDir::new()?;
    let pyshacl = fake_pyshacl(tools.path())?;

    let mut no_shapes = with_root(VALIDATE_SHACL, root.path());
    no_shapes.arg("--pyshacl").arg(&pyshacl);
    assert_eq!(run_to_completion(no_shapes)?.code, 1);

    let dcat3 = root.path().join("dcat-us3");
    fs::write(dcat3.join("dcat-us_3.0_shacl_shapes.ttl"), "")?;
    let mut no_program = with_root(VALIDATE_SHACL, root.path());
    no_program
        .arg("--pyshacl")
        .arg(tools.path().join("not-there"));
    assert_eq!(run_to_completion(no_program)?.code, 2);

    fs::remove_dir(dcat3.join("examples"))?;
    let mut no_examples = with_root(VALIDATE_SHACL, root.path());
    no_examples.arg("--pyshacl").arg(&pyshacl);
    assert_eq!(run_to_completion(no_examples)?.code, 3);
    Ok(())
}

#[test]
fn combiner_writes_expanded_schema() -> Result<()> {
    let root = TempDir::new()?;
    schema_root(root.path())?;

    let output = run_command(with_root(COMBINE, root.path()))?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Definitions included: 2"));
    assert!(stdout.contains("Title: Catalog"));

    let expanded = read_json(
        &root
            .path()
            .join("dcat-us3")
            .join("jsonschema")
            .join("dcat-us3.0-expanded-schema.json"),
    )?;
    assert!(expanded.get("$id").is_none());
    assert_eq!(expanded["type"], "object");
    assert!(expanded["$defs"]["Dataset"].get("$id").is_none());
    assert!(expanded["$defs"]["Dataset"].get("$defs").is_some());
    Ok(())
}

#[test]
fn explicit_root_must_hold_schema_tree() -> Result<()> {
    let empty = TempDir::new()?;
    let finished = run_to_completion(with_root(VALIDATE_V1, empty.path()))?;
    assert_eq!(finished.code, 1);
    assert!(finished.stderr.contains("does not contain"));
    Ok(())
}
