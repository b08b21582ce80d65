//! Command-line token classification
//!
//! Positional tokens are either `KEY=VALUE` variable assignments or target
//! names.

use crate::config::Variables;

/// Positional arguments split into target names and assignments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    /// Target names in command-line order, without duplicates
    pub targets: Vec<String>,

    /// Variable assignments in command-line order
    pub assignments: Vec<(String, String)>,
}

impl Arguments {
    /// Classify positional tokens
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = Arguments::default();

        for token in tokens {
            let token = token.as_ref();
            match parse_assignment(token) {
                Some((key, value)) => args.assignments.push((key, value)),
                None => {
                    if !args.targets.iter().any(|t| t == token) {
                        args.targets.push(token.to_string());
                    }
                }
            }
        }

        args
    }

    /// Variable set holding the assignments
    pub fn variables(&self) -> Variables {
        Variables::from_assignments(self.assignments.iter().cloned())
    }
}

/// Split a `KEY=VALUE` token
///
/// Tokens starting with `-` are never assignments.
pub fn parse_assignment(token: &str) -> Option<(String, String)> {
    if token.starts_with('-') {
        return None;
    }
    token
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
}
