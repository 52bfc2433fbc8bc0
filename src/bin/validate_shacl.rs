//! Validate DCAT-US 3.0 JSON-LD documents against the SHACL shapes by
//! driving `pyshacl`.
//!
//! Exit status: 0 when everything conforms, 1 on non-conformance or a missing
//! shapes file, 2 when `pyshacl` cannot be found, 3 when the examples
//! directory is missing.

use anyhow::Result;
use clap::Parser;
use dcat_us::logging::init_logging;
use dcat_us::shacl::ShaclError;
use dcat_us::validation::ValidationRun;
use dcat_us::{SchemaLayout, ShaclValidator};
use std::io;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "validate-dcat-us3-shacl",
    about = "Validate DCAT-US 3.0 JSON-LD files against the SHACL shapes"
)]
struct Cli {
    /// A single JSON-LD file to validate
    file: Option<PathBuf>,
    /// Directory containing dcat-us3/
    #[arg(long)]
    root: Option<PathBuf>,
    /// pyshacl executable (defaults to $DCAT_US_PYSHACL, then PATH)
    #[arg(long, value_name = "PATH")]
    pyshacl: Option<PathBuf>,
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

    println!("=== DCAT-US 3.0 SHACL Validation ===");
    println!();
    println!("Loading SHACL shapes...");
    let layout = SchemaLayout::discover(cli.root.as_deref())?;
    let validator = match ShaclValidator::new(&layout.v3_shapes(), cli.pyshacl.as_deref()) {
        Ok(validator) => validator,
        Err(err @ ShaclError::MissingShapes(_)) => {
            println!("ERROR: {err}");
            return Ok(1);
        }
        Err(err) => {
            println!("ERROR: {err}");
            return Ok(2);
        }
    };

    debug!(
        shapes = %validator.shapes().display(),
        program = %validator.program().display(),
        "SHACL validator ready"
    );

    let examples = layout.v3_examples();
    let run = ValidationRun {
        file: cli.file.as_deref(),
        examples: &examples,
        extensions: &["jsonld", "json"],
        missing_examples_status: 3,
        summary_heading: "SHACL VALIDATION SUMMARY",
    };
    let mut stdout = io::stdout().lock();
    run.execute(&mut stdout, |path, out| validator.report_file(path, out))
}
