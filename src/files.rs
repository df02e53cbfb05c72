//! Output tree writes.
//!
//! Every file the build produces goes through here. Overwriting an existing
//! file is allowed but logged as a warning, since within one build it almost
//! always means two sources mapped to the same output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
#[error("could not {action} {path}: {source}")]
pub struct FileError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FileError {
    fn new(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<(), FileError> {
    if path.exists() {
        log::warn!("{} already exists. Overwriting.", path.display());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FileError::new("create", parent, e))?;
    }
    fs::write(path, content).map_err(|e| FileError::new("write", path, e))
}

/// Copy one file, creating parent directories as needed.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FileError> {
    if to.exists() {
        log::warn!("{} already exists. Overwriting.", to.display());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| FileError::new("create", parent, e))?;
    }
    fs::copy(from, to).map_err(|e| FileError::new("copy", from, e))?;
    Ok(())
}

/// Recursively copy `from` into `to`, preserving structure.
///
/// Dotfiles and dot-directories (VCS metadata, the thumbnail cache) are
/// skipped. Returns the number of files copied.
pub fn copy_dir(from: &Path, to: &Path) -> Result<usize, FileError> {
    let mut copied = 0;
    let walker = WalkDir::new(from)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            FileError::new("read", &path, io::Error::from(e))
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| FileError::new("create", &target, e))?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Delete a directory tree. A missing tree is not an error.
///
/// Returns whether anything was removed.
pub fn remove_tree(path: &Path) -> Result<bool, FileError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FileError::new("remove", path, e)),
    }
}

/// Create a directory and its parents.
pub fn ensure_dir(path: &Path) -> Result<(), FileError> {
    fs::create_dir_all(path).map_err(|e| FileError::new("create", path, e))
}
