//! Process command - transform a single spreadsheet.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use recont_core::{Pipeline, ProcessKind};

use super::{load_config, KindArg};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input spreadsheet
    #[arg(required = true)]
    input: PathBuf,

    /// Transform to apply
    #[arg(short, long, value_enum, default_value = "extract")]
    kind: KindArg,

    /// Output file (default: next to the input, named after the transform)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the processing report as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let kind = ProcessKind::from(args.kind);
    let pipeline = Pipeline::new(config);
    let input = args.input.clone();
    let output = args.output.clone();

    // Workbook reads and writes are blocking.
    let report = tokio::task::spawn_blocking(move || match output {
        Some(output) => pipeline.process(&input, kind, &output),
        None => {
            let dir = input
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            pipeline.process_into(&input, kind, &dir)
        }
    })
    .await??;

    debug!("Processed in {}ms", report.processing_time_ms);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} -> {} ({} rows)",
        style("✓").green(),
        report.input.display(),
        report.output.display(),
        report.rows
    );

    for warning in &report.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    Ok(())
}
