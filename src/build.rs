//! Build orchestrator.
//!
//! A build is a strictly sequential walk through [`BuildState`]:
//!
//! ```text
//! configured → cleaned → scaffolded → posts-built → pages-built
//!            → demos-built → assets-copied → done
//! ```
//!
//! Layouts and the transform pipeline are set up while still `configured`,
//! so a broken layout aborts before the previous output is deleted. Any
//! error aborts the run where it stands; whatever was already written stays
//! on disk. [`Builder::state`] reports the last state reached.
//!
//! Feeds are written in the posts step, from the ordered post list.

use crate::cache::CacheStats;
use crate::config::{ASSET_ROLES, ConfigError, DirRole, POSTS_OUTPUT_DIR, SiteConfig};
use crate::demos::{DemoError, DemoStats, build_demos};
use crate::feed::{FeedError, write_feeds};
use crate::files::{FileError, copy_dir, ensure_dir, remove_tree};
use crate::imaging::{ImageBackend, RustBackend};
use crate::site::{SiteError, build_pages, build_posts, listed};
use crate::templates::{TemplateError, Templates};
use crate::transform::{Pipeline, TransformError};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Layout error: {0}")]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Site(#[from] SiteError),
    #[error("Demo error: {0}")]
    Demo(#[from] DemoError),
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("Thumbnail error: {0}")]
    Transform(#[from] TransformError),
    #[error(transparent)]
    File(#[from] FileError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildState {
    Configured,
    Cleaned,
    Scaffolded,
    PostsBuilt,
    PagesBuilt,
    DemosBuilt,
    AssetsCopied,
    Done,
}

impl BuildState {
    /// The state after this one, `None` once done.
    pub fn next(self) -> Option<Self> {
        use BuildState::*;
        match self {
            Configured => Some(Cleaned),
            Cleaned => Some(Scaffolded),
            Scaffolded => Some(PostsBuilt),
            PostsBuilt => Some(PagesBuilt),
            PagesBuilt => Some(DemosBuilt),
            DemosBuilt => Some(AssetsCopied),
            AssetsCopied => Some(Done),
            Done => None,
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BuildState::Configured => "configured",
            BuildState::Cleaned => "cleaned",
            BuildState::Scaffolded => "scaffolded",
            BuildState::PostsBuilt => "posts-built",
            BuildState::PagesBuilt => "pages-built",
            BuildState::DemosBuilt => "demos-built",
            BuildState::AssetsCopied => "assets-copied",
            BuildState::Done => "done",
        };
        f.write_str(label)
    }
}

/// One static directory copied into the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCopy {
    pub role: DirRole,
    pub source: PathBuf,
    pub files: usize,
}

/// What a finished build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub output: PathBuf,
    pub removed_previous: bool,
    pub posts: usize,
    pub listed: usize,
    pub pages: usize,
    pub feed_entries: usize,
    pub demos: DemoStats,
    pub assets: Vec<AssetCopy>,
    pub thumbnails: CacheStats,
}

/// Drives one build through every state.
pub struct Builder<'a, B: ImageBackend> {
    config: &'a SiteConfig,
    root: &'a Path,
    backend: &'a B,
    state: BuildState,
}

impl<'a, B: ImageBackend> Builder<'a, B> {
    pub fn new(config: &'a SiteConfig, root: &'a Path, backend: &'a B) -> Self {
        Self {
            config,
            root,
            backend,
            state: BuildState::Configured,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    fn advance(&mut self, to: BuildState) {
        debug_assert_eq!(self.state.next(), Some(to));
        log::debug!("Build state {} → {}", self.state, to);
        self.state = to;
    }

    pub fn run(&mut self) -> Result<BuildReport, BuildError> {
        let config = self.config;
        let root = self.root;
        let templates = Templates::load(&config.source_path(root, DirRole::Layouts))?;
        let mut pipeline = Pipeline::new(config, root, self.backend);
        let output = config.output_root(root);
        let mut report = BuildReport {
            output: output.clone(),
            ..Default::default()
        };

        report.removed_previous = remove_tree(&output)?;
        if report.removed_previous {
            log::info!("Removed previous output {}", output.display());
        }
        self.advance(BuildState::Cleaned);

        ensure_dir(&output)?;
        ensure_dir(&output.join(POSTS_OUTPUT_DIR))?;
        ensure_dir(&config.output_path(root, DirRole::Demos))?;
        self.advance(BuildState::Scaffolded);

        let posts = build_posts(config, root, &mut pipeline, &templates)?;
        report.posts = posts.len();
        report.listed = listed(&posts).len();
        report.feed_entries = write_feeds(config, root, &posts)?;
        self.advance(BuildState::PostsBuilt);

        report.pages = build_pages(config, root, &posts, &mut pipeline, &templates)?.len();
        self.advance(BuildState::PagesBuilt);

        report.demos = build_demos(config, root, &templates, pipeline.highlighter())?;
        self.advance(BuildState::DemosBuilt);

        report.thumbnails = pipeline.finish()?;
        report.assets = copy_assets(config, root)?;
        self.advance(BuildState::AssetsCopied);

        self.advance(BuildState::Done);
        log::info!("Build complete: {}", output.display());
        Ok(report)
    }
}

/// Full build with the pixel backend.
pub fn build_site(config: &SiteConfig, root: &Path) -> Result<BuildReport, BuildError> {
    let backend = RustBackend::new();
    Builder::new(config, root, &backend).run()
}

/// Source directories whose contents are copied verbatim.
///
/// The log images directory is normally inside the images directory; when
/// configured elsewhere it is copied on its own.
fn asset_sources(config: &SiteConfig, root: &Path) -> Vec<(DirRole, PathBuf)> {
    let mut sources: Vec<(DirRole, PathBuf)> = ASSET_ROLES
        .iter()
        .map(|&role| (role, config.source_path(root, role)))
        .collect();
    let log_images = config.source_path(root, DirRole::LogImages);
    if !log_images.starts_with(config.source_path(root, DirRole::Images)) {
        sources.push((DirRole::LogImages, log_images));
    }
    sources
}

/// Copy every static directory that exists. Missing ones are skipped with a warning.
pub fn copy_assets(config: &SiteConfig, root: &Path) -> Result<Vec<AssetCopy>, BuildError> {
    let mut copies = Vec::new();
    for (role, source) in asset_sources(config, root) {
        if !source.is_dir() {
            log::warn!(
                "{} directory {} does not exist, skipping",
                role.key(),
                source.display()
            );
            continue;
        }
        let files = copy_dir(&source, &config.output_path(root, role))?;
        log::debug!("Copied {} files from {}", files, source.display());
        copies.push(AssetCopy {
            role,
            source,
            files,
        });
    }
    Ok(copies)
}

/// Refresh the static directories in an existing output tree.
///
/// Removes each output copy, then copies the source again. Posts, pages and
/// demos are left alone.
pub fn update_static(config: &SiteConfig, root: &Path) -> Result<Vec<AssetCopy>, BuildError> {
    for (role, _) in asset_sources(config, root) {
        let target = config.output_path(root, role);
        if !remove_tree(&target)? {
            log::warn!("{} does not exist", target.display());
        }
    }
    copy_assets(config, root)
}
