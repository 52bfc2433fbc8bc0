//! Validate DCAT-US 3.0 JSON-LD documents against the 3.0 JSON Schema.

use anyhow::Result;
use clap::Parser;
use dcat_us::logging::init_logging;
use dcat_us::validation::{V3_LABEL, ValidationRun};
use dcat_us::{SchemaLayout, SchemaValidator};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "validate-dcat-us3",
    about = "Validate DCAT-US 3.0 JSON-LD files (default: every file in dcat-us3/examples)"
)]
struct Cli {
    /// A single JSON-LD file to validate
    file: Option<PathBuf>,
    /// Directory containing dcat-us3/
    #[arg(long)]
    root: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    println!("=== {V3_LABEL} Validation ===");
    println!();
    println!("Loading schemas...");
    let layout = SchemaLayout::discover(cli.root.as_deref())?;
    let validator = SchemaValidator::v3(&layout)?;

    let examples = layout.v3_examples();
    let run = ValidationRun {
        file: cli.file.as_deref(),
        examples: &examples,
        extensions: &["jsonld", "json"],
        missing_examples_status: 1,
        summary_heading: "JSON SCHEMA VALIDATION SUMMARY",
    };
    let mut stdout = io::stdout().lock();
    run.execute(&mut stdout, |path, out| validator.report_file(path, out))
}
