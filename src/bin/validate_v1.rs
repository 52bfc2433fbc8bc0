//! Validate DCAT-US 1.1 JSON documents against the 1.1 catalog schema.

use anyhow::Result;
use clap::Parser;
use dcat_us::logging::init_logging;
use dcat_us::validation::{V1_LABEL, ValidationRun};
use dcat_us::{SchemaLayout, SchemaValidator};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "validate-dcat-us1",
    about = "Validate DCAT-US 1.1 JSON files (default: every file in dcat-us1.1/examples)"
)]
struct Cli {
    /// A single JSON file to validate
    file: Option<PathBuf>,
    /// Directory containing dcat-us1.1/
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

    println!("=== {V1_LABEL} Validation ===");
    println!();
    println!("Loading schemas...");
    let layout = SchemaLayout::discover(cli.root.as_deref())?;
    let validator = SchemaValidator::v1(&layout)?;

    let examples = layout.v1_examples();
    let run = ValidationRun {
        file: cli.file.as_deref(),
        examples: &examples,
        extensions: &["json"],
        missing_examples_status: 1,
        summary_heading: "JSON SCHEMA VALIDATION SUMMARY",
    };
    let mut stdout = io::stdout().lock();
    run.execute(&mut stdout, |path, out| validator.report_file(path, out))
}
