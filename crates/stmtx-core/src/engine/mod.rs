//! Declarative extraction engine.
//!
//! Issuer formats are data: a [`PipelineTable`] of issuers, each with
//! document types recognized by [`Fingerprint`]s, each with [`Block`]s whose
//! [`Transaction`] pipelines turn a range of lines into an item.

mod block;
mod context;
mod extractor;
mod router;
mod section;
mod step;
mod transaction;

pub use block::{Block, BlockPipeline, DocumentType, Fingerprint, Issuer, PipelineTable};
pub use context::Context;
pub use extractor::{ExtractionResult, Extractor};
pub use router::{route, BlockRun, Routing};
pub use section::{Assign, Section};
pub use step::{anchored, match_step, Step};
pub use transaction::Transaction;
