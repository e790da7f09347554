//! Locating blocks inside a document.

use std::ops::Range;

use tracing::debug;

use crate::document::Document;

use super::block::{Block, DocumentType, Issuer, PipelineTable};

/// One block to run through one pipeline.
pub struct BlockRun<'a> {
    pub issuer: &'a Issuer,
    pub document_type: &'a DocumentType,
    pub block: &'a Block,
    /// Line range, end exclusive.
    pub range: Range<usize>,
}

/// Every block found in a document, ordered by start line then registration
/// order.
pub struct Routing<'a> {
    pub runs: Vec<BlockRun<'a>>,
    /// At least one document type of a matching issuer matched.
    pub recognized: bool,
}

/// Find the blocks of `document` for every matching document type.
///
/// A block ends before the next start marker of any matched block or at the
/// document end. An explicit end marker found earlier ends it inclusively.
/// `max_lines` caps blocks that declare no size of their own.
pub fn route<'a>(document: &Document, table: &'a PipelineTable, max_lines: Option<usize>) -> Routing<'a> {
    let text = document.text();
    let lines = document.lines();

    let mut matched: Vec<(&Issuer, &DocumentType)> = Vec::new();
    for issuer in table.issuers().iter().filter(|i| i.matches(&text)) {
        for document_type in issuer.document_types().iter().filter(|t| t.matches(&text)) {
            debug!(
                "{}: matched {} / {}",
                document.source(),
                issuer.label(),
                document_type.name()
            );
            matched.push((issuer, document_type));
        }
    }

    let recognized = !matched.is_empty();
    if !recognized {
        debug!("{}: no document type matched", document.source());
    }

    let blocks: Vec<(&Issuer, &DocumentType, &Block)> = matched
        .iter()
        .flat_map(|&(issuer, doc_type)| doc_type.blocks().iter().map(move |b| (issuer, doc_type, b)))
        .collect();

    // (line, block index) for every start marker occurrence
    let mut starts: Vec<(usize, usize)> = Vec::new();
    for (line, text) in lines.iter().enumerate() {
        for (index, (_, _, block)) in blocks.iter().enumerate() {
            if block.is_start(text) {
                starts.push((line, index));
            }
        }
    }

    let mut runs = Vec::with_capacity(starts.len());
    for (position, &(start, index)) in starts.iter().enumerate() {
        let (issuer, document_type, block) = blocks[index];

        let next_start = starts[position..]
            .iter()
            .map(|(line, _)| *line)
            .find(|line| *line > start)
            .unwrap_or(lines.len());

        // An end marker only counts before the next start line
        let mut end = match &block.end {
            Some(end) => lines[start + 1..next_start]
                .iter()
                .position(|l| end.is_match(l))
                .map(|offset| start + 1 + offset + 1)
                .unwrap_or(next_start),
            None => next_start,
        };

        if let Some(max) = block.max_size.or(max_lines) {
            end = end.min(start + max.max(1));
        }

        debug!(
            "{}: block {}..{} for {}",
            document.source(),
            start + 1,
            end,
            document_type.name()
        );

        runs.push(BlockRun {
            issuer,
            document_type,
            block,
            range: start..end,
        });
    }

    Routing { runs, recognized }
}
