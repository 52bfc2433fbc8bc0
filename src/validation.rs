//! JSON Schema validation of DCAT-US documents and the shared example-run
//! reporting used by every validator binary.

use crate::layout::SchemaLayout;
use crate::read_json_file;
use crate::schema::{SchemaStore, compile, inline_v3_schema, resolve_refs};
use anyhow::{Context, Result};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const V1_LABEL: &str = "DCAT-US 1.1 JSON Schema";
pub const V3_LABEL: &str = "DCAT-US 3.0 JSON Schema";
pub const RULE: &str = "============================================================";

/// One schema error, with both paths split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub message: String,
    pub instance_path: Vec<String>,
    pub schema_path: Vec<String>,
}

impl SchemaViolation {
    /// `Error:`, then `Path:` and `Schema Path:` when they are not the root.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Error: {}", self.message)];
        if !self.instance_path.is_empty() {
            lines.push(format!("Path: {}", self.instance_path.join(" -> ")));
        }
        if !self.schema_path.is_empty() {
            lines.push(format!("Schema Path: {}", self.schema_path.join(" -> ")));
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Conforms,
    Violations(Vec<SchemaViolation>),
}

impl DocumentOutcome {
    pub fn conforms(&self) -> bool {
        matches!(self, DocumentOutcome::Conforms)
    }
}

fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// A compiled, self-contained schema plus the label used in reports.
pub struct SchemaValidator {
    label: String,
    compiled: JSONSchema,
}

impl SchemaValidator {
    pub fn new(label: impl Into<String>, schema: &Value) -> Result<Self> {
        let label = label.into();
        let compiled = compile(schema).with_context(|| format!("preparing {label}"))?;
        Ok(Self { label, compiled })
    }

    /// The 1.1 catalog schema with `dataset.json` and other siblings inlined.
    pub fn v1(layout: &SchemaLayout) -> Result<Self> {
        let (catalog, store) = SchemaStore::for_v1(layout)?;
        debug!(documents = store.len(), "loaded DCAT-US 1.1 schema store");
        Self::new(V1_LABEL, &resolve_refs(&catalog, &store))
    }

    /// The 3.0 main schema with its definitions inlined around `Catalog`.
    pub fn v3(layout: &SchemaLayout) -> Result<Self> {
        let (main, store) = SchemaStore::for_v3(layout)?;
        if store.is_empty() {
            warn!(
                dir = %layout.v3_definitions().display(),
                "no definition schemas found; Catalog falls back to a permissive schema"
            );
        }
        debug!(documents = store.len(), "loaded DCAT-US 3.0 schema store");
        Self::new(V3_LABEL, &inline_v3_schema(&main, &store))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn validate_document(&self, document: &Value) -> DocumentOutcome {
        match self.compiled.validate(document) {
            Ok(()) => DocumentOutcome::Conforms,
            Err(errors) => DocumentOutcome::Violations(
                errors
                    .map(|err| SchemaViolation {
                        message: err.to_string(),
                        instance_path: pointer_segments(&err.instance_path.to_string()),
                        schema_path: pointer_segments(&err.schema_path.to_string()),
                    })
                    .collect(),
            ),
        }
    }

    /// Load `path` and validate it; load failures are returned as errors.
    pub fn validate_file(&self, path: &Path) -> Result<DocumentOutcome> {
        let document = read_json_file(path)?;
        let outcome = self.validate_document(&document);
        debug!(
            document = %path.display(),
            schema = self.label(),
            conforms = outcome.conforms(),
            "validated document"
        );
        Ok(outcome)
    }

    /// Validate `path` and write the per-document report. Returns whether the
    /// document conforms.
    pub fn report_file(&self, path: &Path, out: &mut impl Write) -> io::Result<bool> {
        let name = display_name(path);
        match self.validate_file(path) {
            Err(err) => {
                writeln!(out, "ERROR: Failed to load {}: {err:#}", path.display())?;
                Ok(false)
            }
            Ok(DocumentOutcome::Conforms) => {
                writeln!(out, "SUCCESS: {name} conforms to {}", self.label)?;
                Ok(true)
            }
            Ok(DocumentOutcome::Violations(violations)) => {
                writeln!(out, "FAILURE: {name} does not conform to {}", self.label)?;
                for violation in &violations {
                    for line in violation.render_lines() {
                        writeln!(out, "  {line}")?;
                    }
                }
                Ok(false)
            }
        }
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ValidationSummary {
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn write(&self, heading: &str, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{RULE}")?;
        writeln!(out, "{heading}:")?;
        writeln!(out, "  Total files processed: {}", self.total)?;
        writeln!(out, "  Successful validations: {}", self.succeeded)?;
        writeln!(out, "  Failed validations: {}", self.failed)?;
        if self.all_passed() {
            writeln!(out, "All validations passed successfully")?;
        }
        Ok(())
    }
}

/// Run `check` over each file, separating results with a blank line.
pub fn run_examples<W, F>(files: &[PathBuf], out: &mut W, mut check: F) -> io::Result<ValidationSummary>
where
    W: Write,
    F: FnMut(&Path, &mut W) -> io::Result<bool>,
{
    writeln!(out, "{RULE}")?;
    let mut summary = ValidationSummary::default();
    for file in files {
        let passed = check(file, out)?;
        summary.record(passed);
        writeln!(out)?;
    }
    Ok(summary)
}

/// What a validator binary was asked to check.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRun<'a> {
    /// A single document named on the command line.
    pub file: Option<&'a Path>,
    /// Directory validated when no file is given.
    pub examples: &'a Path,
    pub extensions: &'a [&'a str],
    /// Exit status when `examples` does not exist.
    pub missing_examples_status: i32,
    pub summary_heading: &'a str,
}

impl ValidationRun<'_> {
    /// Validate the single file or every example, writing results to `out`,
    /// and return the process exit status.
    pub fn execute<W, F>(&self, out: &mut W, mut check: F) -> Result<i32>
    where
        W: Write,
        F: FnMut(&Path, &mut W) -> io::Result<bool>,
    {
        if let Some(file) = self.file {
            if !file.exists() {
                writeln!(out, "ERROR: File {} not found", file.display())?;
                return Ok(1);
            }
            writeln!(out)?;
            writeln!(out, "=== VALIDATION RESULTS FOR {} ===", file.display())?;
            let passed = check(file, out)?;
            return Ok(if passed { 0 } else { 1 });
        }

        if !self.examples.is_dir() {
            writeln!(
                out,
                "ERROR: Examples directory not found: {}",
                self.examples.display()
            )?;
            return Ok(self.missing_examples_status);
        }
        let files = crate::collect_documents(self.examples, self.extensions)?;
        if files.is_empty() {
            writeln!(
                out,
                "WARNING: No example files found in {}",
                self.examples.display()
            )?;
            return Ok(0);
        }
        writeln!(out, "Found {} example files", files.len())?;
        let summary = run_examples(&files, out, &mut check)?;
        summary.write(self.summary_heading, out)?;
        Ok(if summary.all_passed() { 0 } else { 1 })
    }
}
