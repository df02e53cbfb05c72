//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which decides whether
//! a thumbnail is needed, and the [`backend`](super::backend), which does the
//! pixel work.

use std::path::PathBuf;

/// Full specification for one thumbnail: source, destination, exact size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}
