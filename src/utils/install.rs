//! File installation
//!
//! Files are written to a hidden temporary file next to the destination and
//! renamed into place, so a destination is never observed half-written.

use crate::utils::{base, dir, join};
use std::fs::{self, File};
use std::io::{self, Read};
use tempfile::Builder;

/// Install `source` at `destination`
///
/// A destination ending in `/` is a directory; the source file name is kept.
pub fn install(destination: &str, source: &str, executable: bool) -> io::Result<()> {
    let dest = if destination.ends_with('/') {
        join([destination, base(source).as_str()])
    } else {
        destination.to_string()
    };

    let file = File::open(source)?;
    install_data(&dest, file, executable)
}

/// Install data read from `source` at `destination`
///
/// Parent directories are created. The file mode is 0755 for executables and
/// 0644 otherwise.
pub fn install_data<R: Read>(destination: &str, mut source: R, executable: bool) -> io::Result<()> {
    println!("Installing {}", destination);

    let parent = dir(destination);
    fs::create_dir_all(&parent)?;

    let mut prefix = format!("{}.", base(destination));
    if !prefix.starts_with('.') {
        prefix.insert(0, '.');
    }

    // Removed on drop unless persisted
    let mut temp = Builder::new().prefix(&prefix).tempfile_in(&parent)?;

    io::copy(&mut source, temp.as_file_mut())?;
    set_mode(temp.as_file(), executable)?;
    temp.as_file().sync_all()?;

    temp.persist(destination).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &File, executable: bool) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = if executable { 0o755 } else { 0o644 };
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _executable: bool) -> io::Result<()> {
    Ok(())
}
