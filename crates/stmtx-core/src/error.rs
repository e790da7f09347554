//! Error types for the stmtx-core library.

use thiserror::Error;

/// Main error type for the stmtx library.
#[derive(Error, Debug)]
pub enum StmtxError {
    /// Extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// A pipeline pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Step-level failures. These are recovered by the section combinator:
/// they trigger the next alternative or skip an optional section.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// No line in the scanned range matched the step.
    #[error("no line from {line} matched `{pattern}`")]
    NoMatch { pattern: String, line: usize },

    /// A capture was already set in this attempt with another value.
    #[error("capture `{key}` already set to `{existing}`, got `{value}`")]
    DuplicateCapture {
        key: String,
        existing: String,
        value: String,
    },

    /// The steps matched but a declared attribute was never captured.
    #[error("attribute `{0}` was not captured")]
    MissingAttribute(String),
}

/// Field-level value conversion failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The string is not a number in the requested locale.
    #[error("malformed number: `{0}`")]
    MalformedNumber(String),

    /// The string does not match the requested date format.
    #[error("malformed date: `{0}`")]
    MalformedDate(String),

    /// The currency symbol is not in the lookup table.
    #[error("unknown currency symbol: `{0}`")]
    UnknownCurrencySymbol(String),
}

/// Block-level errors. A block that fails with one of these emits no item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// A mandatory section or alternation did not match.
    #[error("section {section} did not match: {reason}")]
    SectionMatchFailed { section: usize, reason: StepError },

    /// A captured value could not be converted.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// An assign callback read a key that no section captured.
    #[error("missing capture: {0}")]
    MissingCapture(String),

    /// The target record lacks a field required to build the item.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The pipeline itself is incomplete.
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

/// A failed block, tagged for a human reviewer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source_id}:{line} [{document_type}]: {error}")]
pub struct BlockError {
    /// Identifier of the originating document.
    pub source_id: String,
    /// 1-based line number where the block starts.
    pub line: usize,
    /// Name of the document type whose pipeline ran.
    pub document_type: String,
    /// What went wrong.
    pub error: ExtractError,
}

/// Result type for the stmtx library.
pub type Result<T> = std::result::Result<T, StmtxError>;
