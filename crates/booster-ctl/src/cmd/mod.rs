//! CLI command modules.

pub mod args;
pub mod boost;
pub mod query;
