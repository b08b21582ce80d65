//! Target list validation

use crate::error::{ConfigError, ConfigResult};
use crate::runner::Task;
use std::collections::HashSet;

/// Name reserved for the help flag
pub const RESERVED_NAME: &str = "help";

/// Validate the top-level targets
///
/// Names must be unique and must not be [`RESERVED_NAME`]. Returns whether
/// any target is marked default.
pub fn validate_targets(targets: &[Task]) -> ConfigResult<bool> {
    let mut names = HashSet::new();
    let mut defaults = false;

    for task in targets {
        if task.is_default() {
            defaults = true;
        }

        if let Some(name) = task.name().filter(|name| !name.is_empty()) {
            if name == RESERVED_NAME {
                return Err(ConfigError::ReservedName(name.to_string()));
            }
            if !names.insert(name) {
                return Err(ConfigError::DuplicateTarget(name.to_string()));
            }
        }
    }

    Ok(defaults)
}
