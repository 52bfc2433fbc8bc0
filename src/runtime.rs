//! Locating external programs.
//!
//! SHACL validation shells out to `pyshacl`; this module decides which
//! executable that is so every caller uses the same search order.

use std::env;
use std::path::{Path, PathBuf};

pub const PYSHACL_ENV: &str = "DCAT_US_PYSHACL";
pub const PYSHACL_PROGRAM: &str = "pyshacl";

/// A regular file with at least one execute bit. Off unix any regular file
/// counts.
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    #[cfg(unix)]
    let runnable = {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    };
    #[cfg(not(unix))]
    let runnable = true;
    meta.is_file() && runnable
}

/// First `PATH` entry holding an executable called `name`.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    env::split_paths(&env::var_os("PATH")?)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Resolve the `pyshacl` executable: an explicit path, then
/// `DCAT_US_PYSHACL`, then PATH.
pub fn resolve_pyshacl(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return is_executable(path).then(|| path.to_path_buf());
    }
    if let Some(configured) = env::var_os(PYSHACL_ENV) {
        if !configured.is_empty() {
            let path = PathBuf::from(configured);
            return is_executable(&path).then_some(path);
        }
    }
    find_on_path(PYSHACL_PROGRAM)
}
