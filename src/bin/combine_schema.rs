//! Combine the DCAT-US 3.0 definition files into one expanded schema rooted
//! at `Catalog`, with every definition under `$defs`.

use anyhow::{Context, Result, bail};
use clap::Parser;
use dcat_us::logging::init_logging;
use dcat_us::schema::load_definitions;
use dcat_us::{SchemaLayout, combine_definitions};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "combine-dcat-us3-schema",
    about = "Write the expanded DCAT-US 3.0 JSON Schema"
)]
struct Cli {
    /// Directory containing dcat-us3/
    #[arg(long)]
    root: Option<PathBuf>,
    /// Output path (default: dcat-us3/jsonschema/dcat-us3.0-expanded-schema.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let layout = SchemaLayout::discover(cli.root.as_deref())?;
    let definitions_dir = layout.v3_definitions();
    if !definitions_dir.is_dir() {
        bail!(
            "Definitions directory not found: {}",
            definitions_dir.display()
        );
    }

    println!("=== DCAT-US 3.0 Schema Combiner ===");
    println!();
    println!("Loading definitions from: {}", definitions_dir.display());
    let definitions = load_definitions(&definitions_dir)?;
    if definitions.is_empty() {
        bail!("No definitions loaded from {}", definitions_dir.display());
    }
    for name in definitions.keys() {
        info!(definition = %name, "loaded definition");
    }
    println!("Loaded {} definitions", definitions.len());

    let expanded = combine_definitions(&definitions)?;
    let output = cli.output.unwrap_or_else(|| layout.v3_expanded_schema());
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut rendered = serde_json::to_string_pretty(&expanded)?;
    rendered.push('\n');
    fs::write(&output, rendered).with_context(|| format!("writing {}", output.display()))?;

    println!("Wrote expanded schema to: {}", output.display());
    println!(
        "Schema size: {} characters",
        serde_json::to_string(&expanded)?.chars().count()
    );
    let defs = expanded
        .get("$defs")
        .and_then(Value::as_object)
        .map_or(0, |defs| defs.len());
    println!("Definitions included: {defs}");
    if let Some(root_type) = expanded.get("type") {
        println!("Root type: {}", display_value(root_type));
    }
    if let Some(title) = expanded.get("title") {
        println!("Title: {}", display_value(title));
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
