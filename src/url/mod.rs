//! URL handling module for Cache-Probe
//!
//! This module provides host normalization, candidate link resolution with
//! query stripping, and public-suffix-aware registrable domain extraction.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{registrable_domain, report_label};
pub use normalize::{has_accepted_scheme, normalize_host, resolve_candidate, ACCEPTED_SCHEMES};
