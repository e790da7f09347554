//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod issuers;
pub mod process;
