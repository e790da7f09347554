//! Issuer formats as data: identifiers, document types and their blocks.

use std::ops::Range;

use regex::Regex;

use crate::error::ExtractError;
use crate::models::item::Item;
use crate::Result;

/// A pipeline run over one block of lines.
pub trait BlockPipeline: Send + Sync {
    /// Extract at most one item from `range` of `lines`.
    fn parse(&self, lines: &[String], range: Range<usize>) -> std::result::Result<Option<Item>, ExtractError>;

    /// Validate the pipeline once, when it is registered.
    fn check(&self) -> std::result::Result<(), ExtractError>;
}

/// Predicate over a whole document.
#[derive(Debug, Clone)]
pub enum Fingerprint {
    /// Substring found anywhere in the text.
    Literal(String),
    /// Regex found anywhere in the text.
    Pattern(Regex),
}

impl Fingerprint {
    pub fn literal(text: impl Into<String>) -> Self {
        Fingerprint::Literal(text.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Fingerprint::Pattern(Regex::new(pattern)?))
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Fingerprint::Literal(literal) => text.contains(literal.as_str()),
            Fingerprint::Pattern(pattern) => pattern.is_match(text),
        }
    }
}

/// A start marker and the pipeline run over each block it opens.
pub struct Block {
    pub(crate) start: Regex,
    pub(crate) end: Option<Regex>,
    pub(crate) max_size: Option<usize>,
    pub(crate) pipeline: Box<dyn BlockPipeline>,
}

impl Block {
    /// Register `pipeline` for blocks starting at lines matching `start`.
    ///
    /// Fails if the pattern does not compile or the pipeline is incomplete.
    pub fn new<P>(start: &str, pipeline: P) -> Result<Self>
    where
        P: BlockPipeline + 'static,
    {
        pipeline.check()?;

        Ok(Self {
            start: Regex::new(start)?,
            end: None,
            max_size: None,
            pipeline: Box::new(pipeline),
        })
    }

    /// End each block at (and including) the first later line matching `end`.
    pub fn end(mut self, end: &str) -> Result<Self> {
        self.end = Some(Regex::new(end)?);
        Ok(self)
    }

    /// Cap each block at `lines` lines, counting the start line.
    pub fn max_size(mut self, lines: usize) -> Self {
        self.max_size = Some(lines.max(1));
        self
    }

    pub fn is_start(&self, line: &str) -> bool {
        self.start.is_match(line)
    }

    pub fn parse(&self, lines: &[String], range: Range<usize>) -> std::result::Result<Option<Item>, ExtractError> {
        self.pipeline.parse(lines, range)
    }
}

/// A named statement layout of one issuer.
pub struct DocumentType {
    name: String,
    fingerprints: Vec<Fingerprint>,
    blocks: Vec<Block>,
}

impl DocumentType {
    /// A document type recognized by `pattern` anywhere in the text.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            fingerprints: vec![Fingerprint::pattern(pattern)?],
            blocks: Vec::new(),
        })
    }

    /// Additionally require `fingerprint`.
    pub fn must_include(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprints.push(fingerprint);
        self
    }

    pub fn add_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// All fingerprints must match.
    pub fn matches(&self, text: &str) -> bool {
        self.fingerprints.iter().all(|f| f.matches(text))
    }
}

/// A statement issuer and the document types it produces.
pub struct Issuer {
    label: String,
    identifiers: Vec<Fingerprint>,
    document_types: Vec<DocumentType>,
}

impl Issuer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            identifiers: Vec::new(),
            document_types: Vec::new(),
        }
    }

    /// Documents must contain `identifier` for this issuer to be considered.
    pub fn identified_by(mut self, identifier: Fingerprint) -> Self {
        self.identifiers.push(identifier);
        self
    }

    pub fn add_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_types.push(document_type);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn document_types(&self) -> &[DocumentType] {
        &self.document_types
    }

    /// Any identifier matches; an issuer without identifiers always does.
    pub fn matches(&self, text: &str) -> bool {
        self.identifiers.is_empty() || self.identifiers.iter().any(|f| f.matches(text))
    }
}

/// Every registered issuer, in registration order.
#[derive(Default)]
pub struct PipelineTable {
    issuers: Vec<Issuer>,
}

impl PipelineTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issuer(mut self, issuer: Issuer) -> Self {
        self.issuers.push(issuer);
        self
    }

    pub fn issuers(&self) -> &[Issuer] {
        &self.issuers
    }

    /// Keep only the issuers whose label is in `labels`. An empty list keeps
    /// every issuer.
    pub fn retain_labels(&mut self, labels: &[String]) {
        if labels.is_empty() {
            return;
        }
        self.issuers
            .retain(|issuer| labels.iter().any(|l| l.eq_ignore_ascii_case(issuer.label())));
    }

    pub fn len(&self) -> usize {
        self.issuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}
