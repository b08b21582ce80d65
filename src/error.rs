//! Error types for rmake

use std::io;
use thiserror::Error;

/// Result type alias for rmake operations
pub type Result<T> = std::result::Result<T, MakeError>;

/// Main error type for rmake
#[derive(Error, Debug)]
pub enum MakeError {
    /// Task-tree construction errors (bugs in the build script)
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Bad command-line usage
    #[error("{0}")]
    Usage(#[from] UsageError),

    /// Task execution errors
    #[error("{0}")]
    Execution(#[from] ExecutionError),

    /// Errors raised by the build script while producing its targets
    #[error("{0:#}")]
    Targets(anyhow::Error),
}

impl MakeError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            MakeError::Usage(_) => 2,
            _ => 1,
        }
    }

    /// Whether usage text should accompany the error message
    pub fn wants_usage(&self) -> bool {
        matches!(self, MakeError::Usage(_))
    }
}

impl From<anyhow::Error> for MakeError {
    fn from(err: anyhow::Error) -> Self {
        // Keep typed errors typed when the build script propagated them with `?`
        let err = match err.downcast::<ConfigError>() {
            Ok(config) => return MakeError::Config(config),
            Err(err) => err,
        };
        match err.downcast::<ExecutionError>() {
            Ok(execution) => MakeError::Execution(execution),
            Err(err) => MakeError::Targets(err),
        }
    }
}

/// Task-tree construction errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Target '{0}' is defined more than once")]
    DuplicateTarget(String),

    #[error("Target name '{0}' is reserved")]
    ReservedName(String),

    #[error("Variable {name} accessed with different default values ('{first}' and '{second}')")]
    InconsistentDefault {
        name: String,
        first: String,
        second: String,
    },

    #[error("Path '{0}' has no suffix to replace")]
    InvalidSuffix(String),
}

/// Command-line usage errors
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("No target specified and no default target defined")]
    NoTarget,

    #[error("{0}")]
    InvalidArguments(String),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{command}: {}", describe_status(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{0:#}")]
    Function(anyhow::Error),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Specialized result type for construction operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for usage checks
pub type UsageResult<T> = std::result::Result<T, UsageError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(MakeError::from(UsageError::NoTarget).exit_code(), 2);
        assert_eq!(
            MakeError::from(UsageError::UnknownTarget("x".to_string())).exit_code(),
            2
        );
        assert_eq!(
            MakeError::from(ConfigError::DuplicateTarget("x".to_string())).exit_code(),
            1
        );
        let failed = ExecutionError::CommandFailed {
            command: "false".to_string(),
            code: Some(1),
        };
        assert_eq!(MakeError::from(failed).exit_code(), 1);
    }

    #[test]
    fn test_anyhow_keeps_config_errors_typed() {
        let err = anyhow::Error::new(ConfigError::ReservedName("help".to_string()));
        assert!(matches!(
            MakeError::from(err),
            MakeError::Config(ConfigError::ReservedName(_))
        ));

        let other = MakeError::from(anyhow::anyhow!("boom"));
        assert!(matches!(other, MakeError::Targets(_)));
        assert_eq!(other.exit_code(), 1);
    }

    #[test]
    fn test_command_failed_message() {
        let err = ExecutionError::CommandFailed {
            command: "sh -c \"exit 3\"".to_string(),
            code: Some(3),
        };
        assert_eq!(err.to_string(), "sh -c \"exit 3\": exit status 3");
    }
}
