//! Slash-separated path helpers
//!
//! `base`, `dir`, and `join` operate on strings with `/` separators and
//! lexical cleaning, independent of the host platform.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::fs;
use std::io;
use std::path::Path;

/// Last element of a path
///
/// Trailing slashes are ignored. Empty input gives `.`, all slashes give `/`.
pub fn base(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    match trimmed.rfind('/') {
        Some(i) => trimmed[i + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// All but the last element of a path, cleaned
pub fn dir(path: &str) -> String {
    let parent = match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    };
    clean(parent)
}

/// Join path elements with `/`, ignoring empty ones, and clean the result
pub fn join<I, S>(elems: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = elems
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        return String::new();
    }
    clean(&parts.join("/"))
}

/// Shortest lexically equivalent path
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if out.last().is_some_and(|last| *last != "..") {
                    out.pop();
                } else if !rooted {
                    out.push("..");
                }
            }
            _ => out.push(part),
        }
    }

    let joined = out.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Whether a path exists
///
/// Errors other than "not found" (e.g. permission denied) count as existing.
pub fn exists(path: impl AsRef<Path>) -> bool {
    match fs::metadata(path) {
        Ok(_) => true,
        Err(err) => err.kind() != io::ErrorKind::NotFound,
    }
}

/// First of the candidate executables found on `PATH`
///
/// Returns the candidate as given (not the expanded path), or an empty string
/// if none is found.
pub fn look_path<I, S>(candidates: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if is_on_path(candidate) {
            return candidate.to_string();
        }
    }
    String::new()
}

fn is_on_path(file: &str) -> bool {
    if file.is_empty() {
        return false;
    }
    if file.contains('/') {
        return is_executable(Path::new(file));
    }
    match env::var_os("PATH") {
        Some(paths) => env::split_paths(&paths).any(|dir| is_executable(&dir.join(file))),
        None => false,
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
}

/// Create an empty file, or truncate an existing one
///
/// Parent directories are created as needed.
pub fn touch(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::File::create(path)?;
    Ok(())
}

/// Replace the dot-separated suffix of the file name
///
/// `replace_suffix("src/main.c", ".o")` gives `src/main.o`.
pub fn replace_suffix(path: &str, new_suffix: &str) -> ConfigResult<String> {
    match path.rfind('.') {
        Some(i) if i > 0 && !path[i..].contains('/') => Ok(format!("{}{}", &path[..i], new_suffix)),
        _ => Err(ConfigError::InvalidSuffix(path.to_string())),
    }
}

/// Remove a file or directory tree; missing paths are not an error
pub fn remove_all(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_base() {
        assert_eq!(base("a/b/c.txt"), "c.txt");
        assert_eq!(base("a/b/"), "b");
        assert_eq!(base("c"), "c");
        assert_eq!(base(""), ".");
        assert_eq!(base("///"), "/");
    }

    #[test]
    fn test_dir() {
        assert_eq!(dir("a/b/c.txt"), "a/b");
        assert_eq!(dir("c.txt"), ".");
        assert_eq!(dir("/c.txt"), "/");
        assert_eq!(dir("a//b/./c"), "a/b");
    }

    #[test]
    fn test_join() {
        assert_eq!(join(["a", "b", "c"]), "a/b/c");
        assert_eq!(join(["a", "", "c"]), "a/c");
        assert_eq!(join(["a/", "../b"]), "b");
        assert_eq!(join(["", ""]), "");
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(""), ".");
        assert_eq!(clean("a/../.."), "..");
        assert_eq!(clean("/../a"), "/a");
        assert_eq!(clean("./a/./b/"), "a/b");
    }

    #[test]
    fn test_replace_suffix() {
        assert_eq!(replace_suffix("src/main.c", ".o").unwrap(), "src/main.o");
        assert_eq!(replace_suffix("lib.tar.gz", ".zip").unwrap(), "lib.tar.zip");
        assert!(replace_suffix("Makefile", ".o").is_err());
        assert!(replace_suffix(".hidden", ".o").is_err());
        assert!(replace_suffix("dir.d/file", ".o").is_err());
    }

    #[test]
    fn test_exists_and_touch() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("x/y/z.stamp");
        assert!(!exists(&file));
        touch(&file).unwrap();
        assert!(exists(&file));
    }

    #[test]
    fn test_look_path() {
        assert_eq!(look_path(["rmake-definitely-missing", "sh"]), "sh");
        assert_eq!(look_path(["rmake-definitely-missing"]), "");
    }

    #[test]
    fn test_remove_all() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("tree");
        touch(tree.join("a/b.txt")).unwrap();

        remove_all(&tree).unwrap();
        assert!(!tree.exists());
        remove_all(&tree).unwrap();
    }
}
