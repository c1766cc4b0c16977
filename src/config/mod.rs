//! Configuration module for LinkProbe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is equivalent to loading
//! an empty one.
//!
//! # Example
//!
//! ```no_run
//! use linkprobe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkprobe.toml")).unwrap();
//! println!("Robots limit: {} bytes", config.fetch.robots_max_bytes);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BufferConfig, Config, FetchConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::{parse_worker_count, validate, MAX_WORKERS, MIN_WORKERS};
