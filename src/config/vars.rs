//! Command-line variables
//!
//! Variables are `KEY=VALUE` assignments given on the command line. Target
//! construction code queries them with a default; every query is recorded so
//! that unknown assignments can be rejected and the usage text can list the
//! variables a build script understands.

use crate::error::{ConfigError, ConfigResult};
use std::cell::RefCell;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// Variable values and the registry of queried names
#[derive(Debug, Default)]
pub struct Variables {
    /// Values assigned on the command line
    values: HashMap<String, String>,

    /// Default value each name was first queried with
    defaults: RefCell<BTreeMap<String, String>>,
}

impl Variables {
    /// Create an empty variable set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from assignments; later assignments win
    pub fn from_assignments<I, K, V>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = Self::new();
        for (key, value) in assignments {
            vars.assign(key, value);
        }
        vars
    }

    /// Assign a value
    pub fn assign(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a variable, falling back to `default`
    ///
    /// Querying the same name with two different defaults is an error in the
    /// build script.
    pub fn get(&self, key: &str, default: &str) -> ConfigResult<String> {
        match self.defaults.borrow_mut().entry(key.to_string()) {
            Entry::Occupied(entry) if entry.get() != default => {
                return Err(ConfigError::InconsistentDefault {
                    name: key.to_string(),
                    first: entry.get().clone(),
                    second: default.to_string(),
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                entry.insert(default.to_string());
            }
        }

        Ok(self
            .values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    /// Value assigned on the command line, without recording a query
    pub fn assigned(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether the name has been queried
    pub fn is_known(&self, key: &str) -> bool {
        self.defaults.borrow().contains_key(key)
    }

    /// Assigned names that were never queried, sorted
    pub fn unknown(&self) -> Vec<String> {
        let defaults = self.defaults.borrow();
        let mut names: Vec<String> = self
            .values
            .keys()
            .filter(|key| !defaults.contains_key(key.as_str()))
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Queried names with their effective values, sorted by name
    pub fn entries(&self) -> Vec<(String, String)> {
        self.defaults
            .borrow()
            .iter()
            .map(|(name, default)| {
                let value = self.values.get(name).unwrap_or(default);
                (name.clone(), value.clone())
            })
            .collect()
    }
}
