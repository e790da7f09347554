//! Batch processing command for multiple statement files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use stmtx_core::extractors::default_table;
use stmtx_core::{Document, ExtractionResult, Extractor, SecurityRegistry};

use super::process::{format_result, report_problems, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file (default: from configuration)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue when a file cannot be read
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    extraction: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // One registry for the whole batch
    let registry = Arc::new(SecurityRegistry::new());
    let extractor = Arc::new(Extractor::from_config(
        default_table(Arc::clone(&registry))?,
        &config.extraction,
    ));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let extractor = Arc::clone(&extractor);
        let pb = overall_pb.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let outcome = Document::from_file(&path).map(|doc| extractor.extract_document(&doc));
            pb.inc(1);

            let processing_time_ms = file_start.elapsed().as_millis() as u64;
            match outcome {
                Ok(extraction) => FileResult {
                    path,
                    extraction: Some(extraction),
                    error: None,
                    processing_time_ms,
                },
                Err(e) => FileResult {
                    path,
                    extraction: None,
                    error: Some(e.to_string()),
                    processing_time_ms,
                },
            }
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await?;

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                overall_pb.abandon();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }
        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    let format = args.format.unwrap_or_else(|| config.output.format.into());

    for result in &results {
        let Some(extraction) = &result.extraction else {
            continue;
        };
        report_problems(extraction);

        if let Some(output_dir) = &args.output_dir {
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");

            let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));
            fs::write(&output_path, format_result(extraction, format, &config.output)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let transactions: usize = results
        .iter()
        .filter_map(|r| r.extraction.as_ref())
        .map(|e| e.transactions().count())
        .sum();
    let block_errors: usize = results
        .iter()
        .filter_map(|r| r.extraction.as_ref())
        .map(|e| e.errors.len())
        .sum();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} transactions, {} securities, {} block errors, {} unreadable files",
        style(transactions).green(),
        registry.len(),
        style(block_errors).red(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if config.extraction.fail_on_errors && block_errors > 0 {
        anyhow::bail!("{} block(s) failed to extract", block_errors);
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "transactions",
        "errors",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        match &result.extraction {
            Some(extraction) => {
                let status = if !extraction.unrecognized.is_empty() {
                    "unrecognized"
                } else if extraction.has_errors() {
                    "partial"
                } else {
                    "success"
                };
                let first_error = extraction
                    .errors
                    .first()
                    .map(|e| e.error.to_string())
                    .unwrap_or_default();

                wtr.write_record([
                    filename,
                    status,
                    extraction.transactions().count().to_string().as_str(),
                    extraction.errors.len().to_string().as_str(),
                    result.processing_time_ms.to_string().as_str(),
                    first_error.as_str(),
                ])?;
            }
            None => {
                wtr.write_record([
                    filename,
                    "failed",
                    "0",
                    "0",
                    result.processing_time_ms.to_string().as_str(),
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
