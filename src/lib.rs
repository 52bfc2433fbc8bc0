//! Shared library for the DCAT-US conversion and validation tools.
//!
//! The crate exposes the 1.1 -> 3.0 converter, the schema store used by the
//! JSON Schema validators, the SHACL driver, and the helpers the binaries
//! share: schema-root discovery and document listing. Conventional file
//! locations under the schema root live in [`layout`].

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::BTreeMap;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod convert;
pub mod layout;
pub mod logging;
pub mod runtime;
pub mod schema;
pub mod shacl;
pub mod validation;
pub mod vocabulary;

pub use convert::{
    BatchReport, Container, Conversion, ConversionWarning, ConvertError, Converter, FileReport,
    Warnings, convert_catalog, convert_directory, convert_file,
};
pub use layout::SchemaLayout;
pub use schema::{SchemaStore, combine_definitions, inline_v3_schema, resolve_refs};
pub use shacl::{ShaclOutcome, ShaclValidator, summarize_violations};
pub use validation::{DocumentOutcome, SchemaValidator, SchemaViolation, ValidationSummary};

pub const ROOT_ENV: &str = "DCAT_US_ROOT";

/// Returns true when `candidate` holds at least one DCAT-US schema tree.
fn is_schema_root(candidate: &Path) -> bool {
    candidate.join(layout::V1_DIR).is_dir() || candidate.join(layout::V3_DIR).is_dir()
}

/// One place a schema root may be found.
enum RootCandidate {
    /// Must itself be a root.
    Exact(PathBuf),
    /// The directory or any of its ancestors.
    Ancestors(PathBuf),
}

impl RootCandidate {
    fn locate(&self) -> Option<PathBuf> {
        match self {
            Self::Exact(path) => fs::canonicalize(path)
                .ok()
                .filter(|path| is_schema_root(path)),
            Self::Ancestors(start) => fs::canonicalize(start)
                .ok()?
                .ancestors()
                .find(|dir| is_schema_root(dir))
                .map(Path::to_path_buf),
        }
    }
}

/// Implicit candidates in lookup order. Empty environment values are skipped.
fn implicit_candidates() -> Vec<RootCandidate> {
    let configured = env::var_os(ROOT_ENV).filter(|value| !value.is_empty());
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let build_hint = option_env!("DCAT_US_ROOT_HINT").filter(|hint| !hint.is_empty());

    configured
        .map(|value| RootCandidate::Exact(value.into()))
        .into_iter()
        .chain(env::current_dir().ok().map(RootCandidate::Ancestors))
        .chain(exe_dir.map(RootCandidate::Ancestors))
        .chain(build_hint.map(|hint| RootCandidate::Exact(hint.into())))
        .collect()
}

/// Locate the directory holding `dcat-us1.1/` and/or `dcat-us3/`.
///
/// Search order: an explicit `--root` value, `DCAT_US_ROOT` if it points at a
/// real root, the current directory and its ancestors, the executable's
/// directory and its ancestors, then the build-time hint.
pub fn find_schema_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !is_schema_root(path) {
            bail!(
                "{} does not contain {} or {}",
                path.display(),
                layout::V1_DIR,
                layout::V3_DIR
            );
        }
        return fs::canonicalize(path)
            .with_context(|| format!("canonicalizing schema root {}", path.display()));
    }

    match implicit_candidates().iter().find_map(RootCandidate::locate) {
        Some(root) => Ok(root),
        None => bail!(
            "Unable to locate a DCAT-US schema root. Pass --root or set {ROOT_ENV} to a directory containing {} or {}.",
            layout::V1_DIR,
            layout::V3_DIR
        ),
    }
}

/// List files directly under `dir` whose extension is one of `extensions`,
/// sorted by file name.
///
/// Subdirectories are not descended into; batch conversion and example
/// validation both operate on a flat directory.
pub fn collect_documents(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut results: BTreeMap<String, PathBuf> = BTreeMap::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if !matches {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
            results.insert(name.to_string(), path.clone());
        }
    }
    Ok(results.into_values().collect())
}

/// Read and parse a JSON (or JSON-LD) file.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn collect_documents_filters_and_sorts() -> Result<()> {
        let dir = TempDir::new()?;
        for name in ["b.jsonld", "a.json", "c.txt", "d.JSON"] {
            fs::write(dir.path().join(name), "{}")?;
        }
        fs::create_dir(dir.path().join("nested.json"))?;

        let found = collect_documents(dir.path(), &["json", "jsonld"])?;
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.jsonld"]);
        Ok(())
    }

    #[test]
    fn explicit_root_must_contain_schema_tree() -> Result<()> {
        let dir = TempDir::new()?;
        assert!(find_schema_root(Some(dir.path())).is_err());

        fs::create_dir(dir.path().join(layout::V3_DIR))?;
        let root = find_schema_root(Some(dir.path()))?;
        assert_eq!(root, fs::canonicalize(dir.path())?);
        Ok(())
    }

    #[test]
    fn ancestors_candidate_finds_enclosing_root() -> Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir(dir.path().join(layout::V1_DIR))?;
        let deep = dir.path().join("x").join("y");
        fs::create_dir_all(&deep)?;
        let expected = fs::canonicalize(dir.path())?;
        assert_eq!(RootCandidate::Ancestors(deep.clone()).locate(), Some(expected));
        assert_eq!(RootCandidate::Exact(deep).locate(), None);
        Ok(())
    }

    #[test]
    fn exact_candidate_rejects_missing_and_bare_directories() -> Result<()> {
        let dir = TempDir::new()?;
        assert_eq!(RootCandidate::Exact(dir.path().join("absent")).locate(), None);
        assert_eq!(RootCandidate::Exact(dir.path().to_path_buf()).locate(), None);
        fs::create_dir(dir.path().join(layout::V3_DIR))?;
        assert_eq!(
            RootCandidate::Exact(dir.path().to_path_buf()).locate(),
            Some(fs::canonicalize(dir.path())?)
        );
        Ok(())
    }
}
