//! Core library for declarative statement text extraction.
//!
//! This crate provides:
//! - Locale-aware value normalization (fixed-point numbers, dates, currencies)
//! - A security registry with idempotent lookup-or-create
//! - A pattern engine: steps, sections, alternations and block pipelines
//! - Document routing and an extraction driver tolerant of failed blocks
//! - Bundled issuer pipelines (E*TRADE stock plan confirmations)

pub mod document;
pub mod engine;
pub mod error;
pub mod extractors;
pub mod models;
pub mod registry;
pub mod values;

pub use document::Document;
pub use engine::{ExtractionResult, Extractor, PipelineTable};
pub use error::{BlockError, ExtractError, Result, StepError, StmtxError, ValueError};
pub use models::config::{ExtractionConfig, OutputConfig, OutputFormat, StmtxConfig};
pub use models::item::Item;
pub use models::security::{Security, SecurityAttributes, SecurityId, SecurityRef};
pub use models::transaction::{
    AccountTransaction, AccountTransactionType, Money, PortfolioTransaction, PortfolioTransactionType,
    TransactionDraft, Unit, UnitType,
};
pub use registry::SecurityRegistry;
