//! Seed acquisition
//!
//! # Components
//!
//! - `load_seeds`: the seed list file, the required source of initial URLs
//! - `SeedDiscovery`: optional search-based supplement, never fatal

mod discovery;
mod file;

pub use discovery::{discover_seeds, HtmlSearchDiscovery, SeedDiscovery};
pub use file::load_seeds;
