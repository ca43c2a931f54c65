//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier: deduplication, per-origin politeness and fairness
//! - Request scheduling across concurrent workers
//! - HTTP fetching with explicit failure results
//! - HTML link extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;

pub use coordinator::{run_crawl, CancelHandle, Coordinator};
pub use fetcher::{build_http_client, fetch_url, FetchFailure, FetchResult, Fetcher, HttpFetcher};
pub use frontier::{Frontier, FrontierEntry, Readiness};
pub use parser::extract_links;
pub use scheduler::{Scheduler, SchedulerStats};
