//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the site needs from
//! an imaging library: read dimensions, and write a resized copy.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Write a resized copy of `params.source` to `params.output`.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
