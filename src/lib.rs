//! Ripple-Crawl: a polite, fair breadth-first web crawler
//!
//! The heart of this crate is the crawl frontier ([`crawler::Frontier`]), which
//! decides which discovered URL to dispatch next while never dispatching the
//! same URL twice, spacing requests to any single origin by a politeness
//! interval, and keeping an origin with a deep backlog from starving the rest.
//! Everything around it (fetching, link extraction, URL policy, seeds,
//! metrics, configuration) is a replaceable collaborator.

pub mod config;
pub mod crawler;
pub mod metrics;
pub mod output;
pub mod seeds;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Ripple-Crawl operations
///
/// Only startup failures surface here. Per-page fetch failures are values
/// ([`crawler::FetchResult`]) and never abort a run.
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Seed acquisition errors
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Seed file not found: {0}")]
    NotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Seed discovery request failed: {0}")]
    Discovery(#[from] reqwest::Error),

    #[error("Seed discovery returned HTTP {0}")]
    DiscoveryStatus(u16),
}

/// Result type alias for Ripple-Crawl operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Frontier, FrontierEntry, Readiness, Scheduler};
pub use state::OriginState;
pub use url::{extract_origin, normalize_url, UrlPolicy};
