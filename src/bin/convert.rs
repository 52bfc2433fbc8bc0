//! Convert DCAT-US 1.1 JSON catalogs to DCAT-US 3.0 JSON-LD.
//!
//! A single file is written next to its input as `<stem>-v3.jsonld` unless
//! `--output` names another path. With `--batch`, or when the input is a
//! directory, every `*.json` file in it is converted and `--output` names the
//! destination directory.

use anyhow::Result;
use clap::Parser;
use dcat_us::convert::file::{default_output_path, write_warnings_report};
use dcat_us::logging::init_logging;
use dcat_us::{ConversionWarning, Converter, FileReport, convert_directory, convert_file};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "dcat-us-convert",
    about = "Convert DCAT-US 1.1 JSON catalogs to DCAT-US 3.0 JSON-LD"
)]
struct Cli {
    /// Input JSON file, or a directory in batch mode
    input: PathBuf,
    /// Output file, or output directory in batch mode
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Convert every *.json file in the input directory
    #[arg(long)]
    batch: bool,
    /// Also write conversion warnings to this file as JSON
    #[arg(long, value_name = "PATH")]
    warnings_json: Option<PathBuf>,
    /// Base IRI for minted dataset identifiers
    #[arg(long, value_name = "IRI")]
    dataset_base: Option<String>,
    /// Enable debug logging
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

    let converter = match cli.dataset_base {
        Some(base) => Converter::with_dataset_base(base),
        None => Converter::default(),
    };

    if cli.batch || cli.input.is_dir() {
        let output_dir = cli.output.unwrap_or_else(|| cli.input.clone());
        let report = convert_directory(&converter, &cli.input, &output_dir)?;
        for converted in &report.converted {
            log_warnings(&converted.warnings);
            println!(
                "Successfully converted {} to {}",
                converted.input.display(),
                converted.output.display()
            );
        }
        for failure in &report.failures {
            println!(
                "Error converting {}: {:#}",
                failure.input.display(),
                failure.error
            );
        }
        println!(
            "Batch conversion completed: {}/{} files converted successfully",
            report.success_count(),
            report.total()
        );
        if let Some(path) = &cli.warnings_json {
            save_warnings(path, &report.converted)?;
        }
        return Ok(if report.is_clean() { 0 } else { 1 });
    }

    let output = cli
        .output
        .unwrap_or_else(|| default_output_path(&cli.input));
    match convert_file(&converter, &cli.input, &output) {
        Ok(report) => {
            log_warnings(&report.warnings);
            println!(
                "Successfully converted {} to {}",
                report.input.display(),
                report.output.display()
            );
            if let Some(path) = &cli.warnings_json {
                save_warnings(path, std::slice::from_ref(&report))?;
            }
            Ok(0)
        }
        Err(err) => {
            println!("Error converting {}: {err:#}", cli.input.display());
            Ok(1)
        }
    }
}

fn save_warnings(path: &Path, reports: &[FileReport]) -> Result<()> {
    write_warnings_report(path, reports)?;
    println!("Wrote conversion warnings to {}", path.display());
    Ok(())
}

fn log_warnings(warnings: &[ConversionWarning]) {
    for warning in warnings {
        warn!(
            target: "dcat_us::convert",
            field = %warning.field,
            container = %warning.container,
            "{warning}"
        );
    }
}
