//! Build-script configuration
//!
//! This module handles command-line variables, classification of
//! command-line tokens, and validation of the top-level target list.

pub mod args;
pub mod validate;
pub mod vars;

// Re-export main types
pub use args::*;
pub use validate::*;
pub use vars::*;
