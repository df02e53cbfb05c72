//! Derived-thumbnail generation for log images.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Thumbnail** | `DynamicImage::resize_exact` (Lanczos3), saved in the source format |
//!
//! The module is split into:
//! - **Calculations**: pure dimension math (unit testable)
//! - **Parameters**: data describing one thumbnail job
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: high-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{THUMBNAIL_MARKER, THUMBNAIL_MAX, fit_within, needs_thumbnail, thumbnail_name};
pub use operations::{ThumbnailPlan, create_thumbnail, plan_thumbnail};
pub use params::ThumbnailParams;
pub use rust_backend::RustBackend;
