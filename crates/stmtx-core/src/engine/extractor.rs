//! Extraction driver: routes documents and runs block pipelines.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::document::Document;
use crate::error::BlockError;
use crate::models::config::ExtractionConfig;
use crate::models::item::Item;
use crate::models::security::SecurityId;

use super::block::PipelineTable;
use super::router::route;

/// Items and failures of one extraction run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    /// Extracted items. Each security created during the run precedes the
    /// first transaction that refers to it.
    pub items: Vec<Item>,
    /// Blocks that produced no item because their pipeline failed.
    pub errors: Vec<BlockError>,
    /// Documents that matched no registered document type.
    pub unrecognized: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Transactions only, without the security items.
    pub fn transactions(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_transaction())
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Runs the pipelines of a table over documents.
pub struct Extractor {
    table: PipelineTable,
    max_block_lines: Option<usize>,
}

impl Extractor {
    pub fn new(table: PipelineTable) -> Self {
        Self {
            table,
            max_block_lines: None,
        }
    }

    /// Apply the issuer filter and default block cap of `config`.
    pub fn from_config(mut table: PipelineTable, config: &ExtractionConfig) -> Self {
        table.retain_labels(&config.issuers);
        Self {
            table,
            max_block_lines: config.max_block_lines,
        }
    }

    /// Cap blocks that declare no maximum size.
    pub fn with_max_block_lines(mut self, lines: usize) -> Self {
        self.max_block_lines = Some(lines);
        self
    }

    pub fn table(&self) -> &PipelineTable {
        &self.table
    }

    pub fn extract_document(&self, document: &Document) -> ExtractionResult {
        self.extract(std::slice::from_ref(document))
    }

    /// Extract every document. Failed blocks are recorded and skipped.
    pub fn extract(&self, documents: &[Document]) -> ExtractionResult {
        let start = Instant::now();
        let mut result = ExtractionResult::default();
        let mut transactions = Vec::new();

        for document in documents {
            info!("Extracting {} ({} lines)", document.source(), document.lines().len());

            let routing = route(document, &self.table, self.max_block_lines);
            if !routing.recognized {
                info!("{}: unrecognized document", document.source());
                result.unrecognized.push(document.source().to_string());
                continue;
            }

            for run in &routing.runs {
                match run.block.parse(document.lines(), run.range.clone()) {
                    Ok(Some(mut item)) => {
                        item.set_source(document.source());
                        transactions.push(item);
                    }
                    Ok(None) => {
                        debug!("{}:{}: block produced no item", document.source(), run.range.start + 1);
                    }
                    Err(error) => {
                        let error = BlockError {
                            source_id: document.source().to_string(),
                            line: run.range.start + 1,
                            document_type: run.document_type.name().to_string(),
                            error,
                        };
                        warn!("{}", error);
                        result.errors.push(error);
                    }
                }
            }
        }

        result.items = with_securities(transactions);
        result.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extracted {} items from {} documents ({} errors, {} unrecognized) in {}ms",
            result.items.len(),
            documents.len(),
            result.errors.len(),
            result.unrecognized.len(),
            result.processing_time_ms
        );

        result
    }
}

/// Insert each extracted security once, ahead of its first transaction.
fn with_securities(transactions: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<SecurityId> = HashSet::new();
    let mut items = Vec::with_capacity(transactions.len());

    for item in transactions {
        if let Some(security) = item.security() {
            if security.extracted && seen.insert(security.id) {
                items.push(Item::Security(security.clone()));
            }
        }
        items.push(item);
    }
    items
}
