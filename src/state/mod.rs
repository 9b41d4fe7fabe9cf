//! State module for crawl targets and run lifecycle
//!
//! # Components
//!
//! - `Target`: one fetch unit (URL, method, form payload) plus the timing and
//!   cache headers measured by the double-fetch probe
//! - `Method`: the HTTP method a target is requested with
//! - `CrawlPhase`: lifecycle of one crawl run (seeded, draining, done)

mod crawl_phase;
mod target;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use target::{Method, Target};
