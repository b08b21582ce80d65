//! Task execution engine
//!
//! This module holds the task model, condition combinators, environment
//! overlays, and the memoized traversal that runs a task tree.

pub mod command;
pub mod context;
pub mod env;
pub mod task;
pub mod when;

// Re-export main types
pub use command::*;
pub use context::*;
pub use env::*;
pub use task::*;
pub use when::*;
