//! Output module for crawl summaries
//!
//! This module handles:
//! - Building the end-of-run [`CrawlReport`]
//! - Printing it to stdout

pub mod stats;

pub use stats::{print_report, CrawlReport, StopReason};
