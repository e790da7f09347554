//! Domain models and configuration.

pub mod config;
pub mod item;
pub mod security;
pub mod transaction;
