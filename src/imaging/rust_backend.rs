//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF) | `image` crate (pure Rust decoders) |
//! | Identify | `image::image_dimensions` (header only, no full decode) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode | `DynamicImage::save`, format inferred from the output extension |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ThumbnailParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        resized.save(&params.output).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to write {}: {}",
                params.output.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn thumbnail_writes_requested_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("wide.jpg");
        create_test_jpeg(&source, 2000, 500);

        let output = tmp.path().join("wide.medium.jpg");
        let backend = RustBackend::new();
        backend
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                width: 1024,
                height: 256,
            })
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!(dims, Dimensions { width: 1024, height: 256 });
    }

    #[test]
    fn thumbnail_keeps_png_format() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("tall.png");
        RgbImage::from_pixel(40, 80, image::Rgb([10, 20, 30]))
            .save(&source)
            .unwrap();

        let output = tmp.path().join("tall.medium.png");
        RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                width: 10,
                height: 20,
            })
            .unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn thumbnail_of_garbage_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not an image").unwrap();

        let result = RustBackend::new().thumbnail(&ThumbnailParams {
            source,
            output: tmp.path().join("broken.medium.jpg"),
            width: 10,
            height: 10,
        });
        assert!(result.is_err());
    }
}
