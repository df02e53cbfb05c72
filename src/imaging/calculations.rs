//! Pure calculation functions for thumbnail dimensions and names.
//!
//! All functions here are pure and testable without any I/O or images.

use std::path::Path;

/// Longest edge a published log image may have before a thumbnail is made.
pub const THUMBNAIL_MAX: u32 = 1024;

/// Infix that marks a derived thumbnail file name.
pub const THUMBNAIL_MARKER: &str = ".medium.";

/// Whether either edge exceeds `max`.
pub fn needs_thumbnail(dims: (u32, u32), max: u32) -> bool {
    dims.0 > max || dims.1 > max
}

/// Scale `dims` down so both edges fit within `max`, preserving aspect ratio.
///
/// The longer edge becomes exactly `max`; the shorter edge is rounded and
/// never drops below one pixel. Dimensions already within bounds are
/// returned unchanged.
///
/// ```text
/// (2000, 500)  → (1024, 256)
/// (600, 3000)  → (205, 1024)
/// (800, 600)   → (800, 600)
/// ```
pub fn fit_within(dims: (u32, u32), max: u32) -> (u32, u32) {
    let (w, h) = dims;
    if !needs_thumbnail(dims, max) {
        return dims;
    }
    if w >= h {
        let scaled = (h as f64 * max as f64 / w as f64).round() as u32;
        (max, scaled.max(1))
    } else {
        let scaled = (w as f64 * max as f64 / h as f64).round() as u32;
        (scaled.max(1), max)
    }
}

/// Name of the derived thumbnail for an image file: `photo.jpg` → `photo.medium.jpg`.
pub fn thumbnail_name(filename: &str) -> String {
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{stem}{THUMBNAIL_MARKER}{}", ext.to_string_lossy()),
        None => format!("{stem}.medium"),
    }
}
