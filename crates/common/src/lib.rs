//! Glimpse Common Utilities
//!
//! Shared infrastructure for all Glimpse crates:
//! - Error types and result aliases
//! - Monotonic frame pacing
//! - Tracing/logging initialization (stderr only)
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
