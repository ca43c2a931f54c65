//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `OriginState`: per-origin pending queue, politeness clock and dispatch count

mod origin_state;

pub use origin_state::OriginState;
