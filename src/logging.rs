//! Logging setup for `rmake` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log filter:
//! 1. `-v/--verbose` on the command line (debug)
//! 2. `RMAKE_LOG` environment variable (e.g. "info", "rmake=trace")
//! 3. default to `warn`
//!
//! Logs are sent to STDERR so that stdout stays a clean transcript of the
//! commands that ran.

use crate::runner::Verbosity;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "RMAKE_LOG";

/// Initialise the global logging subscriber.
///
/// Calling it more than once is harmless; later calls are ignored.
pub fn init_logging(verbosity: Verbosity) {
    let filter = match verbosity {
        Verbosity::Verbose => EnvFilter::new("debug"),
        _ => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();
}
