//! Glob expansion

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::Sources;
use std::path::PathBuf;

/// Expand patterns, concatenating the matches of each in order
///
/// A malformed pattern is an error. Unreadable entries are skipped.
pub fn glob<I, S>(patterns: I) -> ExecutionResult<Vec<PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut results = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let paths = ::glob::glob(pattern).map_err(|err| ExecutionError::Glob {
            pattern: pattern.to_string(),
            message: err.msg.to_string(),
        })?;
        results.extend(paths.filter_map(Result::ok));
    }

    Ok(results)
}

/// Dependency source that globs when evaluated
pub fn globber<I, S>(patterns: I) -> Sources
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
    Sources::lazy(move || glob(&patterns))
}
