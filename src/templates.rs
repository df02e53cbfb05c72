//! Layout templates.
//!
//! Layouts are Tera templates (`*.html`) under the layouts directory, loaded
//! once per build. Documents name their layout without the extension:
//! `"layout": "post"` renders with `post.html`. Nested layouts are named by
//! their relative path (`partials/nav.html`), which is also how `{% extends %}`
//! and `{% include %}` refer to them.
//!
//! Auto-escaping is off: bodies are author HTML and must render verbatim.

use crate::walk::{Walk, any_dir, has_extension};
use std::error::Error as _;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error reading layouts in {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not load layouts: {0}")]
    Load(String),
    #[error("layout `{layout}` not found")]
    Missing { layout: String },
    #[error("rendering layout `{layout}` failed: {message}")]
    Render { layout: String, message: String },
}

pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Load every `*.html` under `dir`. A missing directory yields no layouts.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        if dir.is_dir() {
            let walk = Walk::new(dir, any_dir, has_extension("html"));
            let mut files = Vec::new();
            for entry in walk.iter() {
                let entry = entry.map_err(|e| TemplateError::Io {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
                let name = template_name(dir, &entry.path);
                files.push((entry.path, Some(name)));
            }
            tera.add_template_files(files)
                .map_err(|e| TemplateError::Load(describe(&e)))?;
        } else {
            log::warn!("Layouts directory {} does not exist", dir.display());
        }

        log::debug!("Loaded {} layouts from {}", tera.get_template_names().count(), dir.display());
        Ok(Self { tera })
    }

    /// Build from in-memory templates, keyed by file name (`post.html`).
    pub fn from_raw(templates: &[(&str, &str)]) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(templates.iter().copied())
            .map_err(|e| TemplateError::Load(describe(&e)))?;
        Ok(Self { tera })
    }

    pub fn has_layout(&self, layout: &str) -> bool {
        let name = file_name(layout);
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render `layout` with `context`.
    pub fn render(&self, layout: &str, context: &Context) -> Result<String, TemplateError> {
        if !self.has_layout(layout) {
            return Err(TemplateError::Missing {
                layout: layout.to_string(),
            });
        }
        self.tera
            .render(&file_name(layout), context)
            .map_err(|e| TemplateError::Render {
                layout: layout.to_string(),
                message: describe(&e),
            })
    }
}

/// Layout name → template file name.
fn file_name(layout: &str) -> String {
    if layout.ends_with(".html") {
        layout.to_string()
    } else {
        format!("{layout}.html")
    }
}

/// Template name of a file: its path relative to the layouts dir, `/`-separated.
fn template_name(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Tera nests the useful message a few errors deep.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
