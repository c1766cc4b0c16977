//! State tracking module
//!
//! This module contains:
//! - Pipeline stages and per-URL outcomes
//! - The run-wide host and address dedup sets

mod seen;
mod stage;

pub use seen::SeenSets;
pub use stage::{Stage, UrlOutcome};
