//! Demo compiler.
//!
//! Demos are small self-contained examples published under `<output>/demos/`.
//! Each top-level entry of the demos directory is one demo:
//!
//! | Source | Kind | Output |
//! |---|---|---|
//! | `name.json` | structured | `name.html`, rendered with the `demo` layout |
//! | `name.html` holding a JSON object | structured | `name.html`, rendered |
//! | any other `name.html` | standalone | `name.html`, copied byte for byte |
//! | `name/` | folder | `name/`, copied recursively |
//!
//! A structured demo is an object with optional `html`, `css` and `js`
//! strings. The layout receives all three verbatim plus `fmt_js`, the
//! highlighted script (empty when there is none).
//!
//! All kinds share one output namespace, so two sources that map to the same
//! output name are rejected. A missing demos directory just means no demos.

use crate::config::{DirRole, SiteConfig};
use crate::files::{FileError, copy_dir, copy_file, write_file};
use crate::templates::{TemplateError, Templates};
use crate::transform::TransformError;
use crate::transform::highlight::Highlighter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;
use thiserror::Error;
use walkdir::WalkDir;

/// Layout used for structured demos.
pub const DEMO_LAYOUT: &str = "demo";

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: invalid demo JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{first} and {second} would both be published as demos/{name}")]
    Collision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("{path}: {source}")]
    Template {
        path: PathBuf,
        source: TemplateError,
    },
    #[error("{path}: {source}")]
    Highlight {
        path: PathBuf,
        source: TransformError,
    },
    #[error(transparent)]
    File(#[from] FileError),
}

/// The fields of a structured demo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoData {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub js: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoKind {
    Structured(DemoData),
    Standalone,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demo {
    pub source: PathBuf,
    /// Name inside the demos output directory.
    pub output_name: String,
    pub kind: DemoKind,
}

/// Counts per kind, for the build summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DemoStats {
    pub rendered: usize,
    pub copied: usize,
    pub folders: usize,
}

impl DemoStats {
    pub fn total(&self) -> usize {
        self.rendered + self.copied + self.folders
    }
}

/// Classify every entry of the demos directory.
///
/// Files that are neither `.json` nor `.html` are skipped with a warning.
pub fn discover_demos(dir: &Path) -> Result<Vec<Demo>, DemoError> {
    let mut demos = Vec::new();
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in entries {
        let entry = entry.map_err(|e| DemoError::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path().to_path_buf();
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        if entry.file_type().is_dir() {
            demos.push(Demo {
                source: path,
                output_name: name,
                kind: DemoKind::Folder,
            });
            continue;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                let data = read_structured(&path)?;
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                demos.push(Demo {
                    source: path,
                    output_name: format!("{stem}.html"),
                    kind: DemoKind::Structured(data),
                });
            }
            Some("html") => {
                let kind = match read_html_demo(&path)? {
                    Some(data) => DemoKind::Structured(data),
                    None => DemoKind::Standalone,
                };
                demos.push(Demo {
                    source: path,
                    output_name: name,
                    kind,
                });
            }
            _ => log::warn!("Skipping {}: not a demo", path.display()),
        }
    }
    Ok(demos)
}

fn read_text(path: &Path) -> Result<String, DemoError> {
    fs::read_to_string(path).map_err(|e| DemoError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_structured(path: &Path) -> Result<DemoData, DemoError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| DemoError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// An `.html` demo is structured when its content is a JSON object.
fn read_html_demo(path: &Path) -> Result<Option<DemoData>, DemoError> {
    let text = read_text(path)?;
    if !text.trim_start().starts_with('{') {
        return Ok(None);
    }
    match serde_json::from_str::<DemoData>(&text) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.is_syntax() || e.is_eof() => {
            log::debug!("{} is not JSON, copying as is", path.display());
            Ok(None)
        }
        Err(e) => Err(DemoError::Json {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Reject demos that share an output name.
pub fn check_collisions(demos: &[Demo]) -> Result<(), DemoError> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for demo in demos {
        if let Some(first) = seen.insert(&demo.output_name, &demo.source) {
            return Err(DemoError::Collision {
                name: demo.output_name.clone(),
                first: first.to_path_buf(),
                second: demo.source.clone(),
            });
        }
    }
    Ok(())
}

/// Render one structured demo with the demo layout.
pub fn render_structured(
    data: &DemoData,
    source: &Path,
    templates: &Templates,
    highlighter: &Highlighter,
) -> Result<String, DemoError> {
    let fmt_js = if data.js.trim().is_empty() {
        String::new()
    } else {
        highlighter
            .block(&data.js, "js")
            .map_err(|e| DemoError::Highlight {
                path: source.to_path_buf(),
                source: e,
            })?
    };

    let mut context = Context::new();
    context.insert("html", &data.html);
    context.insert("css", &data.css);
    context.insert("js", &data.js);
    context.insert("fmt_js", &fmt_js);
    templates
        .render(DEMO_LAYOUT, &context)
        .map_err(|e| DemoError::Template {
            path: source.to_path_buf(),
            source: e,
        })
}

/// Compile every demo into `<output>/demos`.
pub fn build_demos(
    config: &SiteConfig,
    root: &Path,
    templates: &Templates,
    highlighter: &Highlighter,
) -> Result<DemoStats, DemoError> {
    let source_dir = config.source_path(root, DirRole::Demos);
    if !source_dir.is_dir() {
        log::warn!(
            "Demos directory {} does not exist, skipping demos",
            source_dir.display()
        );
        return Ok(DemoStats::default());
    }

    let demos = discover_demos(&source_dir)?;
    check_collisions(&demos)?;

    let out_dir = config.output_path(root, DirRole::Demos);
    let mut stats = DemoStats::default();
    for demo in &demos {
        let target = out_dir.join(&demo.output_name);
        match &demo.kind {
            DemoKind::Structured(data) => {
                let html = render_structured(data, &demo.source, templates, highlighter)?;
                write_file(&target, &html)?;
                stats.rendered += 1;
            }
            DemoKind::Standalone => {
                copy_file(&demo.source, &target)?;
                stats.copied += 1;
            }
            DemoKind::Folder => {
                copy_dir(&demo.source, &target)?;
                stats.folders += 1;
            }
        }
        log::debug!("Demo {} → {}", demo.source.display(), target.display());
    }

    log::info!("Built {} demos", stats.total());
    Ok(stats)
}
