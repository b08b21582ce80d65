//! Process environment helpers

use std::env;

/// Environment variable, or `default` if unset or empty
pub fn getenv(key: &str, default: &str) -> String {
    non_empty_or(env::var(key).ok(), default)
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Set an environment variable of this process
///
/// Commands spawned afterwards inherit it. Prefer an [`Env`](crate::runner::Env)
/// overlay when only one command needs the variable.
pub fn setenv(key: &str, value: &str) {
    env::set_var(key, value);
}

// Read-only: other tests spawn processes concurrently.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getenv_unset_uses_default() {
        assert_eq!(getenv("RMAKE_TEST_GETENV_NEVER_SET", "fallback"), "fallback");
    }

    #[test]
    fn test_getenv_reads_process_environment() {
        let path = env::var("PATH").unwrap_or_default();
        assert_eq!(getenv("PATH", "fallback"), non_empty_or(Some(path), "fallback"));
    }

    #[test]
    fn test_empty_value_uses_default() {
        assert_eq!(non_empty_or(Some(String::new()), "fallback"), "fallback");
        assert_eq!(non_empty_or(None, "fallback"), "fallback");
        assert_eq!(non_empty_or(Some("set".to_string()), "fallback"), "set");
    }
}
