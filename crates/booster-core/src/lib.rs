//! booster-core — request record, status codes, validation, and config.
//! All other Booster crates depend on this one.

pub mod config;
pub mod error;
pub mod validate;
pub mod wire;

pub use error::{BoostError, InvalidReason};
pub use validate::validate;
pub use wire::{Reply, Status, ThreadData};
