//! Filtered, restartable directory walks.
//!
//! [`Walk`] pairs a root with two predicates: one deciding which directories
//! are descended into, one deciding which files are yielded. Each call to
//! [`Walk::iter`] starts a fresh lazy traversal, so the same walk can be
//! replayed (the dev loop rebuilds with the same walks over and over).
//!
//! Entries are visited depth-first in file-name order, which gives document
//! discovery a stable encounter order.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file accepted by a [`Walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub name: String,
}

pub struct Walk<D, F> {
    root: PathBuf,
    admit_dir: D,
    admit_file: F,
}

impl<D, F> Walk<D, F>
where
    D: Fn(&Path, &str) -> bool,
    F: Fn(&Path, &str) -> bool,
{
    pub fn new(root: impl Into<PathBuf>, admit_dir: D, admit_file: F) -> Self {
        Self {
            root: root.into(),
            admit_dir,
            admit_file,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a new traversal from the root.
    pub fn iter(&self) -> impl Iterator<Item = io::Result<WalkEntry>> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || (self.admit_dir)(entry.path(), &entry.file_name().to_string_lossy())
            })
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let name = entry.file_name().to_string_lossy().to_string();
                    (self.admit_file)(entry.path(), &name).then(|| {
                        Ok(WalkEntry {
                            path: entry.into_path(),
                            name,
                        })
                    })
                }
                Ok(_) => None,
                Err(e) => Some(Err(io::Error::from(e))),
            })
    }

    /// Collect every admitted file, failing on the first traversal error.
    pub fn collect_paths(&self) -> io::Result<Vec<PathBuf>> {
        self.iter().map(|e| e.map(|e| e.path)).collect()
    }
}

/// Directories whose names start with `_` or `.` are internal: sources,
/// output, VCS metadata.
pub fn is_public_dir(_path: &Path, name: &str) -> bool {
    !(name.starts_with('_') || name.starts_with('.'))
}

/// Build a file predicate matching one extension (without the dot).
pub fn has_extension(ext: &'static str) -> impl Fn(&Path, &str) -> bool {
    move |path: &Path, _name: &str| {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == ext)
    }
}

/// Admit every directory.
pub fn any_dir(_path: &Path, _name: &str) -> bool {
    true
}
