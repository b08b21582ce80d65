//! Helpers for build scripts
//!
//! Path, string, glob, environment, and process plumbing used by task
//! construction code and by the built-in task factories.

pub mod env;
pub mod glob;
pub mod install;
pub mod path;
pub mod process;
pub mod strings;

pub use env::*;
pub use self::glob::*;
pub use install::*;
pub use path::*;
pub use process::*;
pub use strings::*;

/// Target architecture of this build, e.g. `x86_64`
pub const ARCH: &str = std::env::consts::ARCH;

/// Target operating system of this build, e.g. `linux`
pub const OS: &str = std::env::consts::OS;
