//! Output module for run summaries
//!
//! This module handles recording per-URL outcomes and printing the run
//! statistics at the end.

pub mod stats;

pub use stats::{print_statistics, RunStatistics};
