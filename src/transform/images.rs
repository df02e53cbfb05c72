//! Log-image references.
//!
//! Authors drop a photo into the log-images directory and mention its bare
//! file name in a post (`Sunset from the ridge: ridge.jpg`). This pass
//! turns each such mention into a link to the full image wrapping an
//! `<img>` of its thumbnail:
//!
//! ```html
//! <a href="/images/log/ridge.jpg"><img class="log-image" src="/images/log/ridge.medium.jpg"></a>
//! ```
//!
//! A token only counts as a reference when the file exists; other file
//! names in prose are left alone. Tokens preceded by `/` or `.` are part of
//! a URL or a longer name (including the markup this pass emits), which
//! makes the pass idempotent. Fenced code blocks are never rewritten.

use super::TransformError;
use super::highlight::CODE_BLOCK;
use crate::cache::{CacheManifest, CacheStats, hash_file};
use crate::imaging::{ImageBackend, THUMBNAIL_MAX, create_thumbnail};
use maud::html;
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static IMAGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_-]+\.(?:jpg|jpeg|gif|png)\b").expect("image token pattern is valid")
});

pub struct ImageRewriter<'a, B: ImageBackend> {
    backend: &'a B,
    dir: PathBuf,
    url: String,
    cache: CacheManifest,
    stats: CacheStats,
    /// Source name → published name, for images already handled this run.
    resolved: HashMap<String, String>,
}

impl<'a, B: ImageBackend> ImageRewriter<'a, B> {
    /// `dir` is the log-images source directory, `url` the path it is served under.
    pub fn new(backend: &'a B, dir: PathBuf, url: String) -> Self {
        let cache = CacheManifest::load(&dir);
        Self {
            backend,
            dir,
            url,
            cache,
            stats: CacheStats::default(),
            resolved: HashMap::new(),
        }
    }

    /// Rewrite every image reference outside fenced code blocks.
    pub fn rewrite(&mut self, text: &str) -> Result<String, TransformError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for block in CODE_BLOCK.find_iter(text) {
            out.push_str(&self.rewrite_prose(&text[last..block.start()])?);
            out.push_str(block.as_str());
            last = block.end();
        }
        out.push_str(&self.rewrite_prose(&text[last..])?);
        Ok(out)
    }

    fn rewrite_prose(&mut self, text: &str) -> Result<String, TransformError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for token in IMAGE_TOKEN.find_iter(text) {
            if matches!(text[..token.start()].chars().next_back(), Some('/' | '.')) {
                continue;
            }
            let name = token.as_str();
            let Some(published) = self.resolve(name)? else {
                continue;
            };
            out.push_str(&text[last..token.start()]);
            out.push_str(&image_link(&self.url, name, &published));
            last = token.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    /// Published file name for an image, making its thumbnail if needed.
    ///
    /// `None` when no such file exists.
    fn resolve(&mut self, name: &str) -> Result<Option<String>, TransformError> {
        if let Some(published) = self.resolved.get(name) {
            return Ok(Some(published.clone()));
        }
        let source = self.dir.join(name);
        if !source.is_file() {
            log::debug!("{} is not a log image, leaving it as text", name);
            return Ok(None);
        }

        let hash = hash_file(&source).map_err(|e| TransformError::Io {
            path: source.clone(),
            source: e,
        })?;
        let thumbnail = match self.cache.find_cached(name, &hash, &self.dir) {
            Some(entry) => {
                self.stats.hit();
                entry.thumbnail.clone()
            }
            None => {
                self.stats.miss();
                let written = create_thumbnail(self.backend, &source, THUMBNAIL_MAX).map_err(
                    |e| TransformError::Image {
                        path: source.clone(),
                        source: e,
                    },
                )?;
                let thumbnail = written
                    .as_deref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().to_string());
                if let Some(thumb) = &thumbnail {
                    log::info!("Thumbnail {} → {}", name, thumb);
                }
                self.cache
                    .insert(name.to_string(), hash, thumbnail.clone());
                thumbnail
            }
        };

        let published = thumbnail.unwrap_or_else(|| name.to_string());
        self.resolved.insert(name.to_string(), published.clone());
        Ok(Some(published))
    }

    /// Persist the thumbnail cache.
    pub fn finish(&mut self) -> Result<CacheStats, TransformError> {
        self.cache.save(&self.dir).map_err(|e| TransformError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        Ok(self.stats)
    }
}

fn image_link(url: &str, name: &str, published: &str) -> String {
    html! {
        a href=(format!("{url}/{name}")) {
            img class="log-image" src=(format!("{url}/{published}"));
        }
    }
    .into_string()
}
