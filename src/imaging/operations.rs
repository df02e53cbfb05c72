//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they read
//! the source dimensions, decide whether a thumbnail is needed, and hand the
//! job to the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{fit_within, needs_thumbnail, thumbnail_name};
use super::params::ThumbnailParams;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// What to do with one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailPlan {
    /// The image already fits; publish it as is.
    Original(Dimensions),
    /// The image is too large; write this thumbnail next to it.
    Resize(ThumbnailParams),
}

/// Plan a thumbnail operation without executing it.
///
/// The thumbnail lands next to the source as `<stem>.medium.<ext>`.
pub fn plan_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    max: u32,
) -> Result<ThumbnailPlan> {
    let dims = backend.identify(source)?;
    if !needs_thumbnail((dims.width, dims.height), max) {
        return Ok(ThumbnailPlan::Original(dims));
    }

    let (width, height) = fit_within((dims.width, dims.height), max);
    let name = source
        .file_name()
        .map(|n| thumbnail_name(&n.to_string_lossy()))
        .ok_or_else(|| {
            BackendError::ProcessingFailed(format!("{} has no file name", source.display()))
        })?;

    Ok(ThumbnailPlan::Resize(ThumbnailParams {
        source: source.to_path_buf(),
        output: source.with_file_name(name),
        width,
        height,
    }))
}

/// Create the thumbnail for `source` if it needs one.
///
/// Returns the path of the written thumbnail, or `None` when the source
/// already fits within `max`.
pub fn create_thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    max: u32,
) -> Result<Option<PathBuf>> {
    match plan_thumbnail(backend, source, max)? {
        ThumbnailPlan::Original(_) => Ok(None),
        ThumbnailPlan::Resize(params) => {
            backend.thumbnail(&params)?;
            Ok(Some(params.output))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::THUMBNAIL_MAX;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    #[test]
    fn small_source_plans_original() {
        let backend = MockBackend::with_dimensions(800, 600);
        let plan = plan_thumbnail(&backend, Path::new("/log/a.jpg"), THUMBNAIL_MAX).unwrap();
        assert_eq!(
            plan,
            ThumbnailPlan::Original(Dimensions {
                width: 800,
                height: 600
            })
        );
    }

    #[test]
    fn wide_source_plans_capped_resize() {
        let backend = MockBackend::with_dimensions(2000, 500);
        let plan = plan_thumbnail(&backend, Path::new("/log/wide.jpg"), THUMBNAIL_MAX).unwrap();
        match plan {
            ThumbnailPlan::Resize(params) => {
                assert_eq!((params.width, params.height), (1024, 256));
                assert_eq!(params.output, Path::new("/log/wide.medium.jpg"));
            }
            other => panic!("expected resize, got {other:?}"),
        }
    }

    #[test]
    fn create_thumbnail_skips_small_images() {
        let backend = MockBackend::with_dimensions(1024, 1024);
        let result = create_thumbnail(&backend, Path::new("/log/a.png"), THUMBNAIL_MAX).unwrap();
        assert_eq!(result, None);
        assert_eq!(backend.thumbnail_count(), 0);
    }

    #[test]
    fn create_thumbnail_uses_backend() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("tall.jpg");
        let backend = MockBackend::with_dimensions(600, 3000);

        let result = create_thumbnail(&backend, &source, THUMBNAIL_MAX).unwrap();

        assert_eq!(result, Some(tmp.path().join("tall.medium.jpg")));
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(
            &ops[1],
            RecordedOp::Thumbnail {
                width: 205,
                height: 1024,
                ..
            }
        ));
    }
}
