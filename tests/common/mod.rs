//! Common test utilities

#![allow(dead_code)]

use rmake::{Context, Verbosity};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Quiet context rooted in a fresh temporary directory
pub fn scratch_context() -> (TempDir, Context) {
    let temp_dir = TempDir::new().unwrap();
    let ctx = Context::new()
        .with_working_dir(temp_dir.path())
        .with_verbosity(Verbosity::Quiet);
    (temp_dir, ctx)
}

/// Write a file and set its modification time
pub fn write_with_mtime(path: &Path, contents: &str, time: SystemTime) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

/// A fixed point in time, offset by `secs`
pub fn at(secs: i64) -> SystemTime {
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    if secs >= 0 {
        base + Duration::from_secs(secs as u64)
    } else {
        base - Duration::from_secs(secs.unsigned_abs())
    }
}

/// Lines of a log file written by test commands
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Shell command appending `line` to `log`
pub fn append_cmd(log: &Path, line: &str) -> Vec<String> {
    vec![
        "sh".to_string(),
        "-c".to_string(),
        format!("echo {} >> '{}'", line, log.display()),
    ]
}

