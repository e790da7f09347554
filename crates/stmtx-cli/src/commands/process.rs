//! Process command - extract transactions from a single statement.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use stmtx_core::extractors::default_table;
use stmtx_core::models::config::OutputConfig;
use stmtx_core::values::{to_decimal, AMOUNT_SCALE};
use stmtx_core::{Document, ExtractionResult, Extractor, Item, Money, SecurityRegistry};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input statement, already converted to plain text
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from configuration)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per transaction
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

impl From<stmtx_core::OutputFormat> for OutputFormat {
    fn from(format: stmtx_core::OutputFormat) -> Self {
        match format {
            stmtx_core::OutputFormat::Json => OutputFormat::Json,
            stmtx_core::OutputFormat::Csv => OutputFormat::Csv,
            stmtx_core::OutputFormat::Text => OutputFormat::Text,
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading statement...");
    let document = Document::from_file(&args.input)?;

    pb.set_message("Extracting transactions...");
    let registry = Arc::new(SecurityRegistry::new());
    let extractor = Extractor::from_config(default_table(registry)?, &config.extraction);
    let result = extractor.extract_document(&document);

    pb.finish_and_clear();

    report_problems(&result);

    let format = args.format.unwrap_or_else(|| config.output.format.into());
    let output = format_result(&result, format, &config.output)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if config.extraction.fail_on_errors && result.has_errors() {
        anyhow::bail!("{} block(s) failed to extract", result.errors.len());
    }

    Ok(())
}

/// Print block errors and unrecognized documents to stderr.
pub fn report_problems(result: &ExtractionResult) {
    for source in &result.unrecognized {
        eprintln!(
            "{} {}: no supported statement format found",
            style("ℹ").blue(),
            source
        );
    }
    for error in &result.errors {
        eprintln!("{} {}", style("✗").red(), error);
    }
}

#[derive(Serialize)]
struct Report<'a> {
    items: &'a [Item],
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ErrorEntry>>,
    unrecognized: &'a [String],
}

#[derive(Serialize)]
struct ErrorEntry {
    source: String,
    line: usize,
    document_type: String,
    message: String,
}

pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    output: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(result, output),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_json(result: &ExtractionResult, output: &OutputConfig) -> anyhow::Result<String> {
    let errors = output.include_errors.then(|| {
        result
            .errors
            .iter()
            .map(|e| ErrorEntry {
                source: e.source_id.clone(),
                line: e.line,
                document_type: e.document_type.clone(),
                message: e.error.to_string(),
            })
            .collect()
    });

    let report = Report {
        items: &result.items,
        errors,
        unrecognized: &result.unrecognized,
    };

    if output.pretty {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(serde_json::to_string(&report)?)
    }
}

/// Flattened view of a transaction for tabular output.
struct Row {
    source: String,
    kind: String,
    date: String,
    security: String,
    ticker: String,
    shares: String,
    amount: Money,
    gross_value: Money,
    taxes: Money,
    fees: Money,
    note: String,
}

fn rows(result: &ExtractionResult) -> Vec<Row> {
    result
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Security(_) => None,
            Item::PortfolioTransaction(tx) => Some(Row {
                source: tx.source.clone(),
                kind: kind_name(&tx.kind),
                date: tx.date_time.format("%Y-%m-%d").to_string(),
                security: tx.security.name.clone(),
                ticker: tx.security.ticker_symbol.clone().unwrap_or_default(),
                shares: tx.shares_decimal().normalize().to_string(),
                amount: tx.amount.clone(),
                gross_value: tx.gross_value.clone(),
                taxes: tx.taxes.clone(),
                fees: tx.fees.clone(),
                note: tx.note.clone().unwrap_or_default(),
            }),
            Item::AccountTransaction(tx) => Some(Row {
                source: tx.source.clone(),
                kind: kind_name(&tx.kind),
                date: tx.date_time.format("%Y-%m-%d").to_string(),
                security: tx.security.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
                ticker: tx
                    .security
                    .as_ref()
                    .and_then(|s| s.ticker_symbol.clone())
                    .unwrap_or_default(),
                shares: String::new(),
                amount: tx.amount.clone(),
                gross_value: tx.gross_value.clone(),
                taxes: tx.taxes.clone(),
                fees: tx.fees.clone(),
                note: tx.note.clone().unwrap_or_default(),
            }),
        })
        .collect()
}

fn kind_name<T: Serialize>(kind: &T) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn decimal(money: &Money) -> String {
    to_decimal(money.amount, AMOUNT_SCALE).to_string()
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "source",
        "type",
        "date",
        "security",
        "ticker",
        "shares",
        "currency",
        "amount",
        "gross_value",
        "taxes",
        "fees",
        "note",
    ])?;

    for row in rows(result) {
        wtr.write_record([
            &row.source,
            &row.kind,
            &row.date,
            &row.security,
            &row.ticker,
            &row.shares,
            &row.amount.currency_code,
            &decimal(&row.amount),
            &decimal(&row.gross_value),
            &decimal(&row.taxes),
            &decimal(&row.fees),
            &row.note,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    for row in rows(result) {
        output.push_str(&format!("{} {} ({})\n", row.date, row.kind, row.source));
        if !row.security.is_empty() {
            output.push_str(&format!("  Security: {}", row.security));
            if !row.ticker.is_empty() {
                output.push_str(&format!(" [{}]", row.ticker));
            }
            output.push('\n');
        }
        if !row.shares.is_empty() {
            output.push_str(&format!("  Shares:   {}\n", row.shares));
        }
        output.push_str(&format!("  Amount:   {}\n", row.amount));
        output.push_str(&format!("  Gross:    {}\n", row.gross_value));
        output.push_str(&format!("  Taxes:    {}\n", row.taxes));
        output.push_str(&format!("  Fees:     {}\n", row.fees));
        if !row.note.is_empty() {
            output.push_str(&format!("  Note:     {}\n", row.note));
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "{} transaction(s), {} error(s)\n",
        result.transactions().count(),
        result.errors.len()
    ));

    output
}
