//! Batch processing command for multiple spreadsheets.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use recont_core::models::config::InputConfig;
use recont_core::{Pipeline, ProcessKind, ProcessReport};

use super::{load_config, KindArg};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input directory or glob pattern
    #[arg(required = true)]
    input: String,

    /// Transform to apply to every file
    #[arg(short, long, value_enum, default_value = "extract")]
    kind: KindArg,

    /// Output directory
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files processed in parallel
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    report: Option<ProcessReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// One line of the summary CSV.
#[derive(Serialize)]
struct SummaryRecord<'a> {
    filename: &'a str,
    kind: ProcessKind,
    status: &'static str,
    output: String,
    rows: usize,
    warnings: usize,
    processing_time_ms: u64,
    error: &'a str,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let kind = ProcessKind::from(args.kind);

    let files = collect_files(&args.input, &config.input)?;

    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.input);
    }

    println!(
        "{} Found {} files to process ({})",
        style("ℹ").blue(),
        files.len(),
        kind
    );

    std::fs::create_dir_all(&args.output_dir)?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Files are independent; each worker gets its own pipeline and a fresh
    // transform per file.
    let pipeline = Pipeline::new(config);
    let jobs = args.jobs.max(1);
    let mut pending = files.into_iter().enumerate();
    let mut running = JoinSet::new();
    let mut indexed = Vec::new();

    loop {
        while running.len() < jobs {
            let Some((index, path)) = pending.next() else {
                break;
            };
            let pipeline = pipeline.clone();
            let output_dir = args.output_dir.clone();
            running.spawn_blocking(move || {
                let file_start = Instant::now();
                let outcome = pipeline.process_into(&path, kind, &output_dir);
                (index, path, outcome, file_start.elapsed().as_millis() as u64)
            });
        }

        let Some(joined) = running.join_next().await else {
            break;
        };
        let (index, path, outcome, processing_time_ms) = joined?;

        match outcome {
            Ok(report) => {
                debug!("Wrote {}", report.output.display());
                indexed.push((
                    index,
                    ProcessResult {
                        path,
                        report: Some(report),
                        error: None,
                        processing_time_ms,
                    },
                ));
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    indexed.push((
                        index,
                        ProcessResult {
                            path,
                            report: None,
                            error: Some(error_msg),
                            processing_time_ms,
                        },
                    ));
                } else {
                    progress.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing {} failed: {}", path.display(), error_msg);
                }
            }
        }

        progress.inc(1);
    }

    // Report in input order regardless of completion order.
    indexed.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = indexed.into_iter().map(|(_, r)| r).collect();

    progress.finish_with_message("Complete");

    let successful = results.iter().filter(|r| r.report.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if args.summary {
        let summary_path = args.output_dir.join("summary.csv");
        write_summary(&summary_path, kind, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand a directory or glob pattern into the spreadsheets to process.
///
/// Files with other extensions and empty files are skipped.
fn collect_files(input: &str, filter: &InputConfig) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = if Path::new(input).is_dir() {
        Path::new(input).join("*").to_string_lossy().into_owned()
    } else {
        input.to_string()
    };

    let mut files = Vec::new();
    for path in glob(&pattern)?.filter_map(|r| r.ok()) {
        if !path.is_file() || !filter.accepts(&path) {
            continue;
        }
        if std::fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true) {
            warn!("Skipping empty file {}", path.display());
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

fn write_summary(path: &Path, kind: ProcessKind, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let record = match &result.report {
            Some(report) => SummaryRecord {
                filename,
                kind,
                status: "success",
                output: report.output.display().to_string(),
                rows: report.rows,
                warnings: report.warnings.len(),
                processing_time_ms: result.processing_time_ms,
                error: "",
            },
            None => SummaryRecord {
                filename,
                kind,
                status: "failed",
                output: String::new(),
                rows: 0,
                warnings: 0,
                processing_time_ms: result.processing_time_ms,
                error: result.error.as_deref().unwrap_or(""),
            },
        };

        wtr.serialize(record)?;
    }

    wtr.flush()?;
    Ok(())
}
