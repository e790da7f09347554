//! Bundled issuer pipelines.

pub mod common;
pub mod etrade;

use std::sync::Arc;

use crate::engine::PipelineTable;
use crate::registry::SecurityRegistry;
use crate::Result;

/// Build the table of every bundled issuer, resolving securities through
/// `registry`.
pub fn default_table(registry: Arc<SecurityRegistry>) -> Result<PipelineTable> {
    Ok(PipelineTable::new().add_issuer(etrade::issuer(registry)?))
}
