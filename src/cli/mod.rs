//! Command-line driver
//!
//! This module turns process arguments into a selection of targets, runs
//! them, and maps failures to exit codes.

pub mod app;

// Re-export main types
pub use app::*;
