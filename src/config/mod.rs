//! Configuration module for Ripple-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing or invalid configuration file is fatal to the run.
//!
//! # Example
//!
//! ```no_run
//! use ripple_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Politeness delay: {}s", config.crawler.politeness_delay);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DiscoveryConfig, MetricsConfig, PolicyConfig, SeedsConfig,
    UserAgentConfig, DEFAULT_BANNED_SUBSTRINGS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
