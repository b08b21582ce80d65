//! rmake - build logic as composable task trees
//!
//! Instead of a declarative makefile, a build script constructs a tree of
//! [`Task`] values: commands, functions, guarded groups, and named targets.
//! [`Make::main`] parses the command line, selects targets, and runs each
//! task at most once per invocation.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod utils;

// Re-export the build-script API
pub use cli::{Make, Outcome, TargetRun};
pub use config::Variables;
pub use error::{MakeError, Result};
pub use runner::{
    all, any, command, command_wrap, directory, directory_of, func, func_in_context, group,
    installation, missing, outdated, predicate, removal, system, target, target_default, when,
    Condition, Context, Env, Sources, Task, Tasks, Verbosity,
};
pub use utils::{
    base, dir, exists, fields, getenv, glob, globber, install, install_data, join, look_path,
    replace_suffix, setenv, touch, wrap, ARCH, OS,
};

/// Current version of rmake
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
