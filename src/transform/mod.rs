//! Body transformer pipeline.
//!
//! A document body goes through three text-to-text stages, in this order:
//!
//! 1. **Images** ([`images`]): bare log-image file names become linked
//!    `<img>` tags, with thumbnails made for oversized photos.
//! 2. **Code** ([`highlight`]): fenced blocks tagged with a language become
//!    line-numbered, class-annotated HTML.
//! 3. **Markdown** ([`markdown`]): everything else is converted to HTML.
//!
//! Stages 1 and 2 both emit literal HTML into markdown source, so they must
//! run first: the markdown converter passes their output through as raw
//! HTML. A document flagged `raw` skips all three stages.

pub mod highlight;
pub mod images;
pub mod markdown;

use crate::cache::CacheStats;
use crate::config::{DirRole, SiteConfig};
use crate::imaging::{BackendError, ImageBackend};
use highlight::Highlighter;
use images::ImageRewriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("image {path}: {source}")]
    Image {
        path: PathBuf,
        source: BackendError,
    },
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unknown code block language `{lang}`")]
    UnknownLanguage { lang: String },
    #[error("highlighting `{lang}` failed: {message}")]
    Highlight { lang: String, message: String },
}

/// The ordered transformer chain, built once per run.
///
/// Holds the syntax definitions and the thumbnail cache so each document
/// reuses them. Call [`Pipeline::finish`] after the last document to persist
/// the cache.
pub struct Pipeline<'a, B: ImageBackend> {
    images: ImageRewriter<'a, B>,
    highlighter: Highlighter,
}

impl<'a, B: ImageBackend> Pipeline<'a, B> {
    pub fn new(config: &SiteConfig, root: &Path, backend: &'a B) -> Self {
        Self {
            images: ImageRewriter::new(
                backend,
                config.source_path(root, DirRole::LogImages),
                config.log_images_url(),
            ),
            highlighter: Highlighter::new(),
        }
    }

    /// Turn a document body into final HTML.
    ///
    /// With `raw` set the body is returned unchanged.
    pub fn render(&mut self, body: &str, raw: bool) -> Result<String, TransformError> {
        if raw {
            return Ok(body.to_string());
        }
        let with_images = self.images.rewrite(body)?;
        let with_code = self.highlighter.highlight_blocks(&with_images)?;
        Ok(markdown::to_html(&with_code))
    }

    /// Shared highlighter, for callers that highlight outside document bodies.
    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Persist the thumbnail cache and report how it fared.
    pub fn finish(&mut self) -> Result<CacheStats, TransformError> {
        self.images.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use std::fs;
    use tempfile::TempDir;

    fn pipeline<'a>(tmp: &TempDir, backend: &'a MockBackend) -> Pipeline<'a, MockBackend> {
        Pipeline::new(&SiteConfig::default(), tmp.path(), backend)
    }

    #[test]
    fn markdown_is_rendered() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::with_dimensions(10, 10);
        let html = pipeline(&tmp, &backend).render("Hello **world**", false).unwrap();
        assert_eq!(html, "<p>Hello <strong>world</strong></p>\n");
    }

    #[test]
    fn raw_body_passes_through_untouched() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("_images/log");
        fs::create_dir_all(&log).unwrap();
        fs::write(log.join("cat.jpg"), "x").unwrap();
        let backend = MockBackend::with_dimensions(4000, 3000);

        let body = "Look: cat.jpg\n\n```rust\nfn main() {}\n```\n*not emphasised*";
        let html = pipeline(&tmp, &backend).render(body, true).unwrap();

        assert_eq!(html, body);
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn code_block_survives_markdown_as_one_block() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::with_dimensions(10, 10);
        let body = "Intro *text*\n\n```rust\nfn main() {\n\n    let x = 1 * 2 * 3;\n}\n```\n\nOutro";
        let html = pipeline(&tmp, &backend).render(body, false).unwrap();

        assert!(html.contains("<p>Intro <em>text</em></p>"));
        assert!(html.contains("<div class=\"code-block\">"));
        assert!(html.contains("<p>Outro</p>"));
        // the multiplication signs must not have turned into emphasis
        assert!(!html.contains("<em> 2 </em>"));
        assert_eq!(html.matches("<div class=\"code-block\">").count(), 1);
    }

    #[test]
    fn image_reference_becomes_linked_tag() {
        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("_images/log");
        fs::create_dir_all(&log).unwrap();
        fs::write(log.join("cat.jpg"), "x").unwrap();
        let backend = MockBackend::with_dimensions(640, 480);

        let html = pipeline(&tmp, &backend).render("A cat: cat.jpg", false).unwrap();
        assert!(html.contains(
            r#"<a href="/images/log/cat.jpg"><img class="log-image" src="/images/log/cat.jpg"></a>"#
        ));
    }

    #[test]
    fn unknown_language_fails_closed() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::with_dimensions(10, 10);
        let err = pipeline(&tmp, &backend)
            .render("```klingon\nqapla'\n```", false)
            .unwrap_err();
        assert!(matches!(err, TransformError::UnknownLanguage { lang } if lang == "klingon"));
    }
}
