//! File-level conversion: one catalog per JSON file, or every `*.json` file in
//! a directory.
//!
//! Output is written through a temporary file in the destination directory
//! and then persisted over the destination path, so a failed conversion never
//! leaves a truncated `.jsonld` behind.

use super::{ConversionWarning, Converter};
use crate::collect_documents;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Suffix that replaces `.json` on converted files.
pub const OUTPUT_SUFFIX: &str = "-v3.jsonld";

#[derive(Debug, Serialize)]
/// Successful conversion of one file.
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub warnings: Vec<ConversionWarning>,
}

#[derive(Debug)]
/// A file the batch could not convert.
pub struct FileFailure {
    pub input: PathBuf,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
/// Outcome of a directory conversion.
pub struct BatchReport {
    pub converted: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn success_count(&self) -> usize {
        self.converted.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// `dir/catalog.json` -> `dir/catalog-v3.jsonld`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Convert `input` and write the JSON-LD result to `output`.
pub fn convert_file(converter: &Converter, input: &Path, output: &Path) -> Result<FileReport> {
    let data =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let source: Value =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", input.display()))?;
    let conversion = converter
        .convert(&source)
        .with_context(|| format!("converting {}", input.display()))?;
    write_json_atomically(output, &conversion.document)?;
    debug!(
        input = %input.display(),
        output = %output.display(),
        warnings = conversion.warnings.len(),
        "converted catalog"
    );
    Ok(FileReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        warnings: conversion.warnings,
    })
}

/// Convert every `*.json` file directly inside `input_dir`.
///
/// Files are processed in name order. A failing file is recorded in the
/// report and the batch moves on; only an unreadable input directory or an
/// output directory that cannot be created aborts the whole run.
pub fn convert_directory(
    converter: &Converter,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchReport> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let inputs = collect_documents(input_dir, &["json"])?;

    let mut report = BatchReport::default();
    for input in inputs {
        let output = output_dir.join(
            default_output_path(&input)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default(),
        );
        match convert_file(converter, &input, &output) {
            Ok(file_report) => report.converted.push(file_report),
            Err(error) => report.failures.push(FileFailure { input, error }),
        }
    }
    Ok(report)
}

/// Write the warnings of every converted file as one JSON array of
/// `{input, output, warnings}` objects.
pub fn write_warnings_report(path: &Path, reports: &[FileReport]) -> Result<()> {
    let value = serde_json::to_value(reports).context("serializing warnings report")?;
    write_json_atomically(path, &value)
}

/// Permissions for a converted file: those of the file being replaced, or
/// world-readable for a new one.
#[cfg(unix)]
fn output_permissions(path: &Path) -> io::Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.permissions()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Ok(fs::Permissions::from_mode(0o644))
        }
        Err(err) => Err(err),
    }
}

fn write_json_atomically(path: &Path, value: &Value) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(parent)
        .with_context(|| format!("staging output in {}", parent.display()))?;
    serde_json::to_writer_pretty(&mut staged, value)
        .with_context(|| format!("serializing {}", path.display()))?;
    staged
        .write_all(b"\n")
        .with_context(|| format!("writing {}", path.display()))?;
    #[cfg(unix)]
    staged
        .as_file()
        .set_permissions(output_permissions(path)?)
        .with_context(|| format!("setting permissions on {}", path.display()))?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
