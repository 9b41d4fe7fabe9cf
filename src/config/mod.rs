//! Configuration module for Cache-Probe
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every field has a default, so a missing section or key
//! falls back to the built-in crawl settings.
//!
//! # Example
//!
//! ```no_run
//! use cache_probe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("cache-probe.toml")).unwrap();
//! println!("Concurrent requests: {}", config.crawler.max_concurrent_requests);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_READ_TIMEOUT_SECS,
};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
