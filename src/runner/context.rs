//! Execution context for task running
//!
//! The context carries everything one invocation of the engine needs: the
//! global dependency list consulted by staleness checks, output verbosity,
//! and the memoization cache of visited task identities. A context is never
//! persisted; create a fresh one per invocation.

use crate::runner::TaskId;
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Execution context that tracks state during task execution
#[derive(Debug)]
pub struct Context {
    /// Directory commands run in and relative condition paths resolve against
    /// (the process working directory when unset)
    pub working_dir: Option<PathBuf>,

    /// Implicit dependencies of every staleness check
    pub global_deps: Vec<PathBuf>,

    /// Verbosity level
    pub verbosity: Verbosity,

    /// Identities already visited during this invocation
    visited: HashSet<TaskId>,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet = 0,
    Normal = 1,
    Verbose = 2,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: None,
            global_deps: Vec::new(),
            verbosity: Verbosity::Normal,
            visited: HashSet::new(),
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the global dependencies
    pub fn with_global_deps<I, P>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.global_deps = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Mark an identity visited; returns false if it already was
    pub fn visit(&mut self, id: TaskId) -> bool {
        self.visited.insert(id)
    }

    /// Check whether an identity has been visited
    pub fn is_visited(&self, id: TaskId) -> bool {
        self.visited.contains(&id)
    }

    /// Number of identities visited so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Forget all visited identities
    pub fn clear_cache(&mut self) {
        self.visited.clear();
    }

    /// Resolve a path against the working directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.working_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Print the transcript line for a command about to run
    pub fn print_running(&self, commandline: &str) {
        if self.verbosity >= Verbosity::Normal {
            println!("Running {}", commandline);
        }
    }

    /// Print an informational transcript line
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            println!("{}", message);
        }
    }

    /// Print a non-fatal diagnostic
    pub fn print_warning(&self, message: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }

    /// Print the "no work" message for a target
    pub fn print_nothing_to_do(&self, target: &str) {
        self.print_info(&format!("Nothing to be done for {}", target));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
