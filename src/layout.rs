//! Conventional file locations under a DCAT-US schema root.
//!
//! ```text
//! <root>/dcat-us1.1/catalog.json, dataset.json, examples/*.json
//! <root>/dcat-us3/jsonschema/dcat_us_3.0.0_schema.json
//! <root>/dcat-us3/jsonschema/definitions/*.json
//! <root>/dcat-us3/dcat-us_3.0_shacl_shapes.ttl
//! <root>/dcat-us3/examples/*.jsonld, *.json
//! ```

use std::path::{Path, PathBuf};

pub const V1_DIR: &str = "dcat-us1.1";
pub const V3_DIR: &str = "dcat-us3";
pub const EXAMPLES_DIR: &str = "examples";
pub const V1_CATALOG_SCHEMA: &str = "catalog.json";
pub const V1_DATASET_SCHEMA: &str = "dataset.json";
pub const V3_SCHEMA_DIR: &str = "jsonschema";
pub const V3_MAIN_SCHEMA: &str = "dcat_us_3.0.0_schema.json";
pub const V3_DEFINITIONS_DIR: &str = "definitions";
pub const V3_SHAPES: &str = "dcat-us_3.0_shacl_shapes.ttl";
pub const V3_EXPANDED_SCHEMA: &str = "dcat-us3.0-expanded-schema.json";

#[derive(Debug, Clone)]
/// Resolved paths for one schema root.
pub struct SchemaLayout {
    root: PathBuf,
}

impl SchemaLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover the root (see [`crate::find_schema_root`]) and wrap it.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        crate::find_schema_root(explicit).map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn v1_dir(&self) -> PathBuf {
        self.root.join(V1_DIR)
    }

    pub fn v1_catalog_schema(&self) -> PathBuf {
        self.v1_dir().join(V1_CATALOG_SCHEMA)
    }

    pub fn v1_dataset_schema(&self) -> PathBuf {
        self.v1_dir().join(V1_DATASET_SCHEMA)
    }

    pub fn v1_examples(&self) -> PathBuf {
        self.v1_dir().join(EXAMPLES_DIR)
    }

    pub fn v3_dir(&self) -> PathBuf {
        self.root.join(V3_DIR)
    }

    pub fn v3_schema_dir(&self) -> PathBuf {
        self.v3_dir().join(V3_SCHEMA_DIR)
    }

    pub fn v3_main_schema(&self) -> PathBuf {
        self.v3_schema_dir().join(V3_MAIN_SCHEMA)
    }

    pub fn v3_definitions(&self) -> PathBuf {
        self.v3_schema_dir().join(V3_DEFINITIONS_DIR)
    }

    pub fn v3_expanded_schema(&self) -> PathBuf {
        self.v3_schema_dir().join(V3_EXPANDED_SCHEMA)
    }

    pub fn v3_shapes(&self) -> PathBuf {
        self.v3_dir().join(V3_SHAPES)
    }

    pub fn v3_examples(&self) -> PathBuf {
        self.v3_dir().join(EXAMPLES_DIR)
    }
}
