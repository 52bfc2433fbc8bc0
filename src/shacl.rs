//! SHACL validation through an external `pyshacl` process.
//!
//! `pyshacl` exits 0 when the data graph conforms, 1 when it does not, and
//! anything else on failure. Its human-readable report goes to stdout.

use crate::runtime::resolve_pyshacl;
use crate::validation::display_name;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

pub const SHACL_LABEL: &str = "DCAT-US 3.0 SHACL shapes";
pub const SUMMARY_LIMIT: usize = 10;

const VIOLATION_KEYWORDS: &[&str] = &[
    "Constraint Violation",
    "Severity",
    "Source Shape",
    "Focus Node",
    "Result Path",
    "Value",
];

#[derive(Debug, Error)]
pub enum ShaclError {
    #[error("SHACL shapes file {0} not found")]
    MissingShapes(PathBuf),
    #[error("pyshacl executable not found; install pyshacl or set DCAT_US_PYSHACL")]
    ProgramNotFound,
    #[error("failed to run {program}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("pyshacl failed on {data} ({status}): {stderr}")]
    Execution {
        data: PathBuf,
        status: String,
        stderr: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaclOutcome {
    Conforms,
    Violations { report: String },
}

#[derive(Debug, Clone)]
pub struct ShaclValidator {
    shapes: PathBuf,
    program: PathBuf,
}

impl ShaclValidator {
    /// `program` overrides the `pyshacl` lookup described in
    /// [`crate::runtime::resolve_pyshacl`].
    pub fn new(shapes: &Path, program: Option<&Path>) -> Result<Self, ShaclError> {
        if !shapes.is_file() {
            return Err(ShaclError::MissingShapes(shapes.to_path_buf()));
        }
        let program = resolve_pyshacl(program).ok_or(ShaclError::ProgramNotFound)?;
        Ok(Self {
            shapes: shapes.to_path_buf(),
            program,
        })
    }

    pub fn shapes(&self) -> &Path {
        &self.shapes
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn validate_file(&self, data: &Path) -> Result<ShaclOutcome, ShaclError> {
        debug!(program = %self.program.display(), data = %data.display(), "running pyshacl");
        let output = Command::new(&self.program)
            .arg("-s")
            .arg(&self.shapes)
            .args(["-sf", "turtle", "-df", "json-ld", "-i", "rdfs", "-a", "-f", "human"])
            .arg(data)
            .output()
            .map_err(|source| ShaclError::Launch {
                program: self.program.clone(),
                source,
            })?;
        match output.status.code() {
            Some(0) => Ok(ShaclOutcome::Conforms),
            Some(1) => Ok(ShaclOutcome::Violations {
                report: String::from_utf8_lossy(&output.stdout).into_owned(),
            }),
            _ => Err(ShaclError::Execution {
                data: data.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    /// Validate `path` and write the per-document report, including the
    /// violation summary on failure. Returns whether the document conforms.
    pub fn report_file(&self, path: &Path, out: &mut impl Write) -> io::Result<bool> {
        let name = display_name(path);
        match self.validate_file(path) {
            Ok(ShaclOutcome::Conforms) => {
                writeln!(out, "SUCCESS: {name} conforms to {SHACL_LABEL}")?;
                Ok(true)
            }
            Ok(ShaclOutcome::Violations { report }) => {
                writeln!(out, "FAILURE: {name} does not conform to {SHACL_LABEL}")?;
                writeln!(out)?;
                writeln!(out, "Detailed Validation Report:")?;
                writeln!(out, "{}", report.trim_end())?;
                write_violation_summary(&summarize_violations(&report), out)?;
                Ok(false)
            }
            Err(err) => {
                writeln!(out, "ERROR: Failed to validate {name}: {err}")?;
                Ok(false)
            }
        }
    }
}

/// Group the violation lines of a text report. Blank lines separate groups;
/// within a group only keyword lines are kept, joined by spaces.
pub fn summarize_violations(report: &str) -> Vec<String> {
    let mut violations = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in report.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                violations.push(current.join(" "));
                current.clear();
            }
            continue;
        }
        if VIOLATION_KEYWORDS.iter().any(|keyword| line.contains(keyword)) {
            current.push(line);
        }
    }
    if !current.is_empty() {
        violations.push(current.join(" "));
    }
    violations
}

pub fn write_violation_summary(violations: &[String], out: &mut impl Write) -> io::Result<()> {
    if violations.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(
        out,
        "Specific Violations Summary ({} total):",
        violations.len()
    )?;
    for (index, violation) in violations.iter().take(SUMMARY_LIMIT).enumerate() {
        writeln!(out, "  {}. {violation}", index + 1)?;
    }
    if violations.len() > SUMMARY_LIMIT {
        writeln!(
            out,
            "  ... and {} more violations",
            violations.len() - SUMMARY_LIMIT
        )?;
    }
    Ok(())
}
