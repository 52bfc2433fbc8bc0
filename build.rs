use std::env;
use std::path::Path;

/// Bakes the schema root fallback into the binaries as `DCAT_US_ROOT_HINT`.
/// An explicit `DCAT_US_ROOT_HINT` at build time wins over the crate directory.
fn main() {
    println!("cargo:rerun-if-env-changed=DCAT_US_ROOT_HINT");

    let Some(raw) = ["DCAT_US_ROOT_HINT", "CARGO_MANIFEST_DIR"]
        .into_iter()
        .find_map(|key| env::var(key).ok().filter(|value| !value.is_empty()))
    else {
        return;
    };
    let root = Path::new(&raw)
        .canonicalize()
        .unwrap_or_else(|_| raw.clone().into());
    println!("cargo:rustc-env=DCAT_US_ROOT_HINT={}", root.display());
}
