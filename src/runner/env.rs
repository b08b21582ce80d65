//! Environment overlays for commands
//!
//! An [`Env`] is merged onto the invoking process's environment when the
//! command it is attached to runs. The ambient environment is never modified.

use crate::runner::{maybe_quote, Task};
use crate::utils::{fields, wrap};
use std::collections::BTreeMap;
use std::fmt;

/// Environment variables to set for a command
///
/// Keys are kept sorted so that rendering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, String>,
}

impl Env {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Iterate over the variables in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Command task running with this environment
    pub fn command<I, S>(&self, argv: I) -> Task
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Task::new_command(argv.into_iter().map(Into::into).collect(), self.clone())
    }

    /// Command task prefixed by `optional` when it is non-empty
    pub fn command_wrap<I, S>(&self, optional: &str, argv: I) -> Task
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Task::new_command(wrap(optional, argv), self.clone())
    }

    /// Command task from a whitespace-separated command line
    ///
    /// No shell is involved: quotes are not interpreted.
    pub fn system(&self, commandline: &str) -> Task {
        Task::new_command(fields(commandline), self.clone())
    }
}

impl<K, V> FromIterator<(K, V)> for Env
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Env {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .vars
            .iter()
            .map(|(k, v)| format!("{}={}", maybe_quote(k), maybe_quote(v)))
            .collect();
        f.write_str(&pairs.join(" "))
    }
}
