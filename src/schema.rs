//! Schema store, `$ref` inlining, and the 3.0 combiner.
//!
//! The DCAT-US schemas reference each other by file name (`dataset.json`,
//! `definitions/Agent.json`) and by JSON pointer (`#/definitions/foo`). Rather
//! than teaching the validator to fetch those, every reference is inlined up
//! front so the compiled schema is self-contained.

use crate::layout::SchemaLayout;
use crate::{collect_documents, read_json_file};
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::{Draft, JSONSchema};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

pub const DRAFT7_URI: &str = "http://json-schema.org/draft-07/schema#";

/// Schema documents addressable by relative path and by bare file name.
#[derive(Debug, Default, Clone)]
pub struct SchemaStore {
    documents: BTreeMap<String, Value>,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `key` and, when `key` has a directory part,
    /// under its bare file name as well.
    pub fn insert(&mut self, key: &str, value: Value) {
        if let Some((_, name)) = key.rsplit_once('/') {
            self.documents.insert(name.to_string(), value.clone());
        }
        self.documents.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let key = key.strip_prefix("./").unwrap_or(key);
        self.documents.get(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Load every `*.json` file directly under `dir`, keyed as
    /// `<prefix>/<name>` (or `<name>` when `prefix` is empty).
    pub fn load_dir(&mut self, dir: &Path, prefix: &str) -> Result<usize> {
        let files = collect_documents(dir, &["json"])?;
        for path in &files {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow!("non-UTF-8 schema file name {}", path.display()))?;
            let key = if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{prefix}/{name}")
            };
            let value = read_json_file(path)?;
            debug!(schema = %key, "loaded schema document");
            self.insert(&key, value);
        }
        Ok(files.len())
    }

    /// The 1.1 catalog schema and its siblings (`dataset.json` and friends).
    pub fn for_v1(layout: &SchemaLayout) -> Result<(Value, Self)> {
        let catalog = read_json_file(&layout.v1_catalog_schema())
            .context("loading DCAT-US 1.1 catalog schema")?;
        read_json_file(&layout.v1_dataset_schema())
            .context("loading DCAT-US 1.1 dataset schema")?;
        let mut store = Self::new();
        store.load_dir(&layout.v1_dir(), "")?;
        Ok((catalog, store))
    }

    /// The 3.0 main schema and every file under `jsonschema/definitions/`.
    pub fn for_v3(layout: &SchemaLayout) -> Result<(Value, Self)> {
        let main = read_json_file(&layout.v3_main_schema())
            .context("loading DCAT-US 3.0 main schema")?;
        let mut store = Self::new();
        let definitions = layout.v3_definitions();
        if definitions.is_dir() {
            store.load_dir(&definitions, crate::layout::V3_DEFINITIONS_DIR)?;
        }
        Ok((main, store))
    }
}

/// Stand-in for references that are circular or cannot be found.
pub fn permissive_schema() -> Value {
    json!({"type": "object", "additionalProperties": true})
}

/// Inline every `$ref` in `schema`, resolving file parts through `store` and
/// pointer-only references against the document they appear in.
pub fn resolve_refs(schema: &Value, store: &SchemaStore) -> Value {
    let mut resolver = RefResolver {
        store,
        active: BTreeSet::new(),
    };
    resolver.resolve(schema, Scope::root(schema))
}

/// The document a node was read from; pointer-only refs resolve against it.
#[derive(Clone, Copy)]
struct Scope<'a> {
    name: &'a str,
    document: &'a Value,
}

impl<'a> Scope<'a> {
    fn root(document: &'a Value) -> Self {
        Self { name: "", document }
    }
}

/// Store lookups accept `Agent.json`, `./Agent.json` and
/// `definitions/Agent.json` for the same document.
fn document_name(file: &str) -> &str {
    file.rsplit('/').next().unwrap_or(file)
}

struct RefResolver<'a> {
    store: &'a SchemaStore,
    /// `(document, pointer)` pairs currently being expanded.
    active: BTreeSet<(&'a str, &'a str)>,
}

impl<'a> RefResolver<'a> {
    fn resolve(&mut self, node: &'a Value, scope: Scope<'a>) -> Value {
        match node {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    return self.follow(reference, scope);
                }
                let resolved: Map<String, Value> = map
                    .iter()
                    .map(|(key, value)| (key.clone(), self.resolve(value, scope)))
                    .collect();
                Value::Object(resolved)
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.resolve(item, scope)).collect())
            }
            other => other.clone(),
        }
    }

    fn follow(&mut self, reference: &'a str, scope: Scope<'a>) -> Value {
        let (file, pointer) = reference.split_once('#').unwrap_or((reference, ""));
        let store = self.store;
        let target_scope = if file.is_empty() {
            Some(scope)
        } else {
            store.get(file).map(|document| Scope {
                name: document_name(file),
                document,
            })
        };
        let Some(target_scope) = target_scope else {
            debug!(reference, "unresolvable $ref replaced with permissive schema");
            return permissive_schema();
        };

        let key = (target_scope.name, pointer);
        if self.active.contains(&key) {
            debug!(reference, "circular $ref replaced with permissive schema");
            return permissive_schema();
        }
        let target = if pointer.is_empty() {
            Some(target_scope.document)
        } else {
            target_scope.document.pointer(pointer)
        };
        let Some(target) = target else {
            debug!(reference, "unresolvable $ref replaced with permissive schema");
            return permissive_schema();
        };

        self.active.insert(key);
        let resolved = self.resolve(target, target_scope);
        self.active.remove(&key);
        resolved
    }
}

/// Build the self-contained 3.0 schema: the resolved `Catalog` definition at
/// the root, with every main-schema definition resolved alongside it.
pub fn inline_v3_schema(main: &Value, store: &SchemaStore) -> Value {
    let definitions = main
        .get("definitions")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let catalog = main
        .pointer("/definitions/Catalog/$ref")
        .and_then(Value::as_str)
        .and_then(|reference| store.get(reference));

    let Some(catalog) = catalog else {
        debug!("Catalog definition not in store; using permissive root");
        return json!({
            "$schema": DRAFT7_URI,
            "type": "object",
            "properties": {},
            "additionalProperties": true,
            "definitions": Value::Object(definitions),
        });
    };

    let resolved_definitions: Map<String, Value> = definitions
        .iter()
        .map(|(name, schema)| (name.clone(), resolve_refs(schema, store)))
        .collect();

    let mut root = Map::new();
    root.insert("$schema".to_string(), Value::String(DRAFT7_URI.to_string()));
    if let Value::Object(resolved_catalog) = resolve_refs(catalog, store) {
        root.extend(resolved_catalog);
    }
    root.insert(
        "definitions".to_string(),
        Value::Object(resolved_definitions),
    );
    Value::Object(root)
}

/// Compile a JSON Schema under draft 7.
pub fn compile(schema: &Value) -> Result<JSONSchema> {
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|err| anyhow!("compiling schema: {err}"))
}

/// Strip `$id`, rename `definitions` to `$defs`, and point `$ref`s at `$defs`.
pub fn clean_definition(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut cleaned = Map::new();
            for (key, child) in map {
                match key.as_str() {
                    "$id" => continue,
                    "$ref" => {
                        let rewritten = match child {
                            Value::String(reference) => Value::String(
                                reference.replace("#/definitions/", "#/$defs/"),
                            ),
                            other => clean_definition(other),
                        };
                        cleaned.insert(key.clone(), rewritten);
                    }
                    "definitions" => {
                        cleaned.insert("$defs".to_string(), clean_definition(child));
                    }
                    _ => {
                        cleaned.insert(key.clone(), clean_definition(child));
                    }
                }
            }
            Value::Object(cleaned)
        }
        Value::Array(items) => Value::Array(items.iter().map(clean_definition).collect()),
        other => other.clone(),
    }
}

/// Combine named definitions into one schema rooted at `Catalog`.
///
/// Definitions are cleaned with [`clean_definition`]; the result is the
/// cleaned `Catalog` object plus a `$defs` map holding every definition.
pub fn combine_definitions(definitions: &BTreeMap<String, Value>) -> Result<Value> {
    let cleaned: Map<String, Value> = definitions
        .iter()
        .map(|(name, schema)| (name.clone(), clean_definition(schema)))
        .collect();
    let Some(Value::Object(catalog)) = cleaned.get("Catalog").cloned() else {
        bail!("Catalog.json not found in definitions directory");
    };
    let mut root = catalog;
    root.insert("$defs".to_string(), Value::Object(cleaned));
    Ok(Value::Object(root))
}

/// Load every definition file under `dir`, keyed by file stem.
pub fn load_definitions(dir: &Path) -> Result<BTreeMap<String, Value>> {
    let mut definitions = BTreeMap::new();
    for path in collect_documents(dir, &["json"])? {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        definitions.insert(stem.to_string(), read_json_file(&path)?);
    }
    Ok(definitions)
}
