//! Site graph: posts and pages.
//!
//! Posts are `*.md` documents under the posts directory. Each is published
//! as `<output>/notebook/<slug>.html`, where the slug comes from the title.
//! Pages are `*.html` documents anywhere under the project root outside
//! `_`/`.` directories, published at the same relative location under the
//! output root.
//!
//! ## Build order
//!
//! 1. **Discover**: walk the posts directory, parse every document
//! 2. **Validate**: dates parse, layouts are named, slugs are unique
//! 3. **Link**: resolve `also` references against the complete post set
//! 4. **Order**: newest first, ties kept in discovery order
//! 5. **Transform**: run each body through the [`Pipeline`]
//! 6. **Render**: layout + context, written to the output tree
//!
//! Pages follow, rendered with the finished post list in their context.
//!
//! ## Template context
//!
//! | Document | Variables |
//! |---|---|
//! | post | `post`, `site` |
//! | page | `page`, `posts` (listed only), `all_posts`, `site` |
//!
//! ## Related posts
//!
//! An `also` entry is a loose identifier. It is matched against every other
//! post in three tiers, and the first tier with any match wins:
//!
//! 1. title, case-insensitive
//! 2. slug, exact
//! 3. source path containing the identifier
//!
//! Identifiers that match nothing are dropped.

use crate::config::{DirRole, POSTS_OUTPUT_DIR, SiteConfig};
use crate::document::{DocumentError, FrontMatter, parse_document};
use crate::files::{FileError, write_file};
use crate::imaging::ImageBackend;
use crate::naming::slugify;
use crate::templates::{TemplateError, Templates};
use crate::transform::{Pipeline, TransformError};
use crate::walk::{Walk, has_extension, is_public_dir};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;
use thiserror::Error;

/// Title used when a document doesn't declare one.
pub const DEFAULT_TITLE: &str = "Untitled";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("{path}: missing `date`")]
    MissingDate { path: PathBuf },
    #[error("{path}: date {value:?} does not match format {format:?}: {message}")]
    BadDate {
        path: PathBuf,
        value: String,
        format: String,
        message: String,
    },
    #[error("{path}: missing `layout`")]
    MissingLayout { path: PathBuf },
    #[error("{path}: {source}")]
    Transform {
        path: PathBuf,
        source: TransformError,
    },
    #[error("{path}: {source}")]
    Template {
        path: PathBuf,
        source: TemplateError,
    },
    #[error("{first} and {second} would both be written to {output}")]
    DuplicateOutput {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
    #[error(transparent)]
    File(#[from] FileError),
}

/// Reference to another post, as exposed to layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
    pub title: String,
    pub slug: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub title: String,
    pub date: NaiveDate,
    pub layout: String,
    pub slug: String,
    /// Site-relative URL, e.g. `/notebook/hello.html`.
    pub url: String,
    pub unlisted: bool,
    pub raw: bool,
    pub also: Vec<String>,
    pub related: Vec<RelatedLink>,
    pub source: PathBuf,
    #[serde(skip)]
    pub body: String,
    /// Body after the transform pipeline.
    pub html: String,
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Post {
    fn link(&self) -> RelatedLink {
        RelatedLink {
            title: self.title.clone(),
            slug: self.slug.clone(),
            url: self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub layout: String,
    pub filename: String,
    pub url: String,
    pub related: Vec<RelatedLink>,
    pub raw: bool,
    pub source: PathBuf,
    #[serde(skip)]
    pub output: PathBuf,
    #[serde(skip)]
    pub body: String,
    pub html: String,
    pub extra: BTreeMap<String, serde_json::Value>,
}

// =============================================================================
// Posts
// =============================================================================

/// Find and parse every post, in discovery order.
pub fn discover_posts(config: &SiteConfig, root: &Path) -> Result<Vec<Post>, SiteError> {
    let posts_dir = config.source_path(root, DirRole::Posts);
    let walk = Walk::new(&posts_dir, is_public_dir, has_extension("md"));
    let paths = walk.collect_paths().map_err(|e| SiteError::Io {
        path: posts_dir.clone(),
        source: e,
    })?;

    let posts = paths
        .iter()
        .map(|path| load_post(config, path))
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("Found {} posts in {}", posts.len(), posts_dir.display());
    Ok(posts)
}

fn read_source(path: &Path) -> Result<String, SiteError> {
    fs::read_to_string(path).map_err(|e| SiteError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn load_post(config: &SiteConfig, path: &Path) -> Result<Post, SiteError> {
    let source = read_source(path)?;
    let doc = parse_document(&source, path)?;
    let fm = doc.front_matter;

    let date = match &fm.date {
        Some(value) => parse_date(path, value, &config.date_format)?,
        None => {
            return Err(SiteError::MissingDate {
                path: path.to_path_buf(),
            });
        }
    };
    let layout = require_layout(path, &fm)?;
    let title = fm.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let slug = slugify(&title);

    log::debug!("Parsed post {} ({})", path.display(), slug);
    Ok(Post {
        url: format!("/{POSTS_OUTPUT_DIR}/{slug}.html"),
        title,
        date,
        layout,
        slug,
        unlisted: fm.unlisted,
        raw: fm.raw,
        also: fm.also,
        related: Vec::new(),
        source: path.to_path_buf(),
        body: doc.body,
        html: String::new(),
        extra: fm.extra,
    })
}

fn parse_date(path: &Path, value: &str, format: &str) -> Result<NaiveDate, SiteError> {
    NaiveDate::parse_from_str(value, format).map_err(|e| SiteError::BadDate {
        path: path.to_path_buf(),
        value: value.to_string(),
        format: format.to_string(),
        message: e.to_string(),
    })
}

fn require_layout(path: &Path, fm: &FrontMatter) -> Result<String, SiteError> {
    match fm.layout.as_deref().map(str::trim) {
        Some(layout) if !layout.is_empty() => Ok(layout.to_string()),
        _ => Err(SiteError::MissingLayout {
            path: path.to_path_buf(),
        }),
    }
}

/// Reject two posts that would publish under the same slug.
pub fn check_unique_slugs(config: &SiteConfig, root: &Path, posts: &[Post]) -> Result<(), SiteError> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for post in posts {
        if let Some(first) = seen.insert(&post.slug, &post.source) {
            return Err(SiteError::DuplicateOutput {
                output: config.posts_output(root).join(format!("{}.html", post.slug)),
                first: first.to_path_buf(),
                second: post.source.clone(),
            });
        }
    }
    Ok(())
}

/// Posts matched by one `also` identifier, skipping `exclude`.
fn resolve_identifier(posts: &[Post], identifier: &str, exclude: Option<usize>) -> Vec<usize> {
    let wanted = identifier.trim();
    if wanted.is_empty() {
        return Vec::new();
    }
    let lowered = wanted.to_lowercase();
    let tiers: [&dyn Fn(&Post) -> bool; 3] = [
        &|p: &Post| p.title.to_lowercase() == lowered,
        &|p: &Post| p.slug == wanted,
        &|p: &Post| p.source.to_string_lossy().contains(wanted),
    ];

    for matches in tiers {
        let hits: Vec<usize> = posts
            .iter()
            .enumerate()
            .filter(|(i, p)| Some(*i) != exclude && matches(*p))
            .map(|(i, _)| i)
            .collect();
        if !hits.is_empty() {
            return hits;
        }
    }
    Vec::new()
}

/// Resolve a list of identifiers into deduplicated links, in declaration order.
fn resolve_related(posts: &[Post], identifiers: &[String], exclude: Option<usize>) -> Vec<RelatedLink> {
    let mut picked: Vec<usize> = Vec::new();
    for identifier in identifiers {
        let hits = resolve_identifier(posts, identifier, exclude);
        if hits.is_empty() {
            log::debug!("Related identifier {identifier:?} matched no post");
        }
        for hit in hits {
            if !picked.contains(&hit) {
                picked.push(hit);
            }
        }
    }
    picked.into_iter().map(|i| posts[i].link()).collect()
}

/// Fill in every post's `related` links from its `also` identifiers.
///
/// Runs over the complete post set, so a post can point at one discovered
/// after it.
pub fn link_related(posts: &mut [Post]) {
    let resolved: Vec<Vec<RelatedLink>> = (0..posts.len())
        .map(|i| resolve_related(posts, &posts[i].also, Some(i)))
        .collect();
    for (post, related) in posts.iter_mut().zip(resolved) {
        post.related = related;
    }
}

/// Sort newest first. The sort is stable, so same-day posts keep discovery order.
pub fn order_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Posts that appear in listings and feeds.
pub fn listed(posts: &[Post]) -> Vec<&Post> {
    posts.iter().filter(|p| !p.unlisted).collect()
}

/// Run the full post pipeline and write every post.
///
/// Returns the ordered post list for pages and feeds.
pub fn build_posts<B: ImageBackend>(
    config: &SiteConfig,
    root: &Path,
    pipeline: &mut Pipeline<'_, B>,
    templates: &Templates,
) -> Result<Vec<Post>, SiteError> {
    let mut posts = discover_posts(config, root)?;
    check_unique_slugs(config, root, &posts)?;
    link_related(&mut posts);
    order_posts(&mut posts);

    for post in &mut posts {
        post.html = pipeline
            .render(&post.body, post.raw)
            .map_err(|e| SiteError::Transform {
                path: post.source.clone(),
                source: e,
            })?;
    }

    let out_dir = config.posts_output(root);
    for post in &posts {
        let mut context = Context::new();
        context.insert("post", post);
        context.insert("site", &config.site);
        let html = templates
            .render(&post.layout, &context)
            .map_err(|e| SiteError::Template {
                path: post.source.clone(),
                source: e,
            })?;
        write_file(&out_dir.join(format!("{}.html", post.slug)), &html)?;
    }

    log::info!("Built {} posts", posts.len());
    Ok(posts)
}

// =============================================================================
// Pages
// =============================================================================

/// Find and parse every standalone page under the project root.
///
/// Configured source and output directories are never pages, whatever
/// they are named.
pub fn discover_pages(config: &SiteConfig, root: &Path, posts: &[Post]) -> Result<Vec<Page>, SiteError> {
    let reserved: Vec<PathBuf> = DirRole::ALL
        .iter()
        .map(|&role| config.source_path(root, role))
        .collect();
    let admit_dir =
        |path: &Path, name: &str| is_public_dir(path, name) && !reserved.iter().any(|r| r == path);
    let walk = Walk::new(root, admit_dir, has_extension("html"));
    let paths = walk.collect_paths().map_err(|e| SiteError::Io {
        path: root.to_path_buf(),
        source: e,
    })?;

    let pages = paths
        .iter()
        .map(|path| load_page(config, root, path, posts))
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("Found {} pages", pages.len());
    Ok(pages)
}

fn load_page(config: &SiteConfig, root: &Path, path: &Path, posts: &[Post]) -> Result<Page, SiteError> {
    let source = read_source(path)?;
    let doc = parse_document(&source, path)?;
    let fm = doc.front_matter;

    let date = fm
        .date
        .as_deref()
        .map(|value| parse_date(path, value, &config.date_format))
        .transpose()?;
    let layout = require_layout(path, &fm)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = fm.filename.clone().unwrap_or(stem);
    let filename = if name.ends_with(".html") {
        name
    } else {
        format!("{name}.html")
    };

    let relative_dir = path
        .strip_prefix(root)
        .ok()
        .and_then(Path::parent)
        .unwrap_or(Path::new(""));
    let output = config.output_root(root).join(relative_dir).join(&filename);
    let url_dir: String = relative_dir
        .components()
        .map(|c| format!("/{}", c.as_os_str().to_string_lossy()))
        .collect();

    Ok(Page {
        title: fm.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        date,
        layout,
        url: format!("{url_dir}/{filename}"),
        filename,
        related: resolve_related(posts, &fm.also, None),
        raw: fm.raw,
        source: path.to_path_buf(),
        output,
        body: doc.body,
        html: String::new(),
        extra: fm.extra,
    })
}

/// Reject two pages that would publish to the same output file.
pub fn check_unique_pages(pages: &[Page]) -> Result<(), SiteError> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    for page in pages {
        if let Some(first) = seen.insert(&page.output, &page.source) {
            return Err(SiteError::DuplicateOutput {
                output: page.output.clone(),
                first: first.to_path_buf(),
                second: page.source.clone(),
            });
        }
    }
    Ok(())
}

/// Build and write every page, each seeing the full ordered post list.
pub fn build_pages<B: ImageBackend>(
    config: &SiteConfig,
    root: &Path,
    posts: &[Post],
    pipeline: &mut Pipeline<'_, B>,
    templates: &Templates,
) -> Result<Vec<Page>, SiteError> {
    let mut pages = discover_pages(config, root, posts)?;
    check_unique_pages(&pages)?;

    let listed_posts = listed(posts);
    for page in &mut pages {
        page.html = pipeline
            .render(&page.body, page.raw)
            .map_err(|e| SiteError::Transform {
                path: page.source.clone(),
                source: e,
            })?;

        let mut context = Context::new();
        context.insert("page", &*page);
        context.insert("posts", &listed_posts);
        context.insert("all_posts", posts);
        context.insert("site", &config.site);
        let html = templates
            .render(&page.layout, &context)
            .map_err(|e| SiteError::Template {
                path: page.source.clone(),
                source: e,
            })?;
        write_file(&page.output, &html)?;
    }

    log::info!("Built {} pages", pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::{SampleSite, write_post};

    fn post(title: &str, date: &str, source: &str) -> Post {
        Post {
            title: title.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            layout: "post".into(),
            slug: slugify(title),
            url: format!("/notebook/{}.html", slugify(title)),
            unlisted: false,
            raw: false,
            also: Vec::new(),
            related: Vec::new(),
            source: PathBuf::from(source),
            body: String::new(),
            html: String::new(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn posts_order_newest_first() {
        let mut posts = vec![
            post("A", "2024-01-01", "a.md"),
            post("C", "2024-03-01", "c.md"),
            post("B", "2024-02-01", "b.md"),
        ];
        order_posts(&mut posts);
        let dates: Vec<String> = posts.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-02-01", "2024-01-01"]);
    }

    #[test]
    fn same_day_posts_keep_discovery_order() {
        let mut posts = vec![
            post("First", "2024-01-01", "1.md"),
            post("Second", "2024-01-01", "2.md"),
            post("Newer", "2024-05-01", "3.md"),
            post("Third", "2024-01-01", "4.md"),
        ];
        order_posts(&mut posts);
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "First", "Second", "Third"]);
    }

    #[test]
    fn also_matches_title_before_slug_before_path() {
        let mut posts = vec![
            post("Rust Notes", "2024-01-01", "_log/2024/rust.md"),
            post("rust-notes-2", "2024-01-02", "_log/other.md"),
            post("Elsewhere", "2024-01-03", "_log/2024/elsewhere.md"),
            post("Source", "2024-01-04", "_log/source.md"),
        ];
        posts[3].also = vec!["rust notes".into(), "2024/".into()];
        link_related(&mut posts);

        let slugs: Vec<&str> = posts[3].related.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["rust-notes", "elsewhere"]);
    }

    #[test]
    fn also_slug_tier() {
        let mut posts = vec![
            post("Hello World", "2024-01-01", "_log/a.md"),
            post("Linker", "2024-01-02", "_log/b.md"),
        ];
        posts[1].also = vec!["hello-world".into()];
        link_related(&mut posts);
        assert_eq!(posts[1].related[0].url, "/notebook/hello-world.html");
    }

    #[test]
    fn also_is_directional_and_drops_unmatched() {
        let mut posts = vec![
            post("One", "2024-01-01", "_log/one.md"),
            post("Two", "2024-01-02", "_log/two.md"),
        ];
        posts[0].also = vec!["two".into(), "no such post".into()];
        link_related(&mut posts);
        assert_eq!(posts[0].related.len(), 1);
        assert!(posts[1].related.is_empty());
    }

    #[test]
    fn also_never_links_self_or_duplicates() {
        let mut posts = vec![
            post("Self", "2024-01-01", "_log/self.md"),
            post("Other", "2024-01-02", "_log/other.md"),
        ];
        posts[0].also = vec!["self".into(), "other".into(), "Other".into(), "".into()];
        link_related(&mut posts);
        let slugs: Vec<&str> = posts[0].related.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["other"]);
    }

    #[test]
    fn duplicate_slugs_rejected() {
        let posts = vec![
            post("Same", "2024-01-01", "_log/a.md"),
            post("same", "2024-01-02", "_log/b.md"),
        ];
        let err = check_unique_slugs(&SiteConfig::default(), Path::new("/p"), &posts).unwrap_err();
        match err {
            SiteError::DuplicateOutput { first, second, .. } => {
                assert_eq!(first, PathBuf::from("_log/a.md"));
                assert_eq!(second, PathBuf::from("_log/b.md"));
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn discover_parses_metadata_and_defaults() {
        let site = SampleSite::new();
        write_post(site.root(), "a.md", r#"{"date": "2024-04-01", "layout": "post"}"#, "body");
        let posts = discover_posts(&site.config, site.root()).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Untitled");
        assert_eq!(posts[0].slug, "untitled");
        assert_eq!(posts[0].body, "body");
    }

    #[test]
    fn bad_date_is_fatal_and_named() {
        let site = SampleSite::new();
        write_post(site.root(), "bad.md", r#"{"title": "x", "date": "01/02/2024", "layout": "post"}"#, "");
        let err = discover_posts(&site.config, site.root()).unwrap_err();
        assert!(matches!(err, SiteError::BadDate { .. }));
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn missing_date_is_fatal() {
        let site = SampleSite::new();
        write_post(site.root(), "nodate.md", r#"{"title": "x", "layout": "post"}"#, "");
        assert!(matches!(
            discover_posts(&site.config, site.root()),
            Err(SiteError::MissingDate { .. })
        ));
    }

    #[test]
    fn missing_layout_is_fatal() {
        let site = SampleSite::new();
        write_post(site.root(), "nolayout.md", r#"{"title": "x", "date": "2024-01-01"}"#, "");
        assert!(matches!(
            discover_posts(&site.config, site.root()),
            Err(SiteError::MissingLayout { .. })
        ));
    }

    #[test]
    fn build_posts_writes_rendered_layout() {
        let site = SampleSite::new();
        write_post(
            site.root(),
            "hi.md",
            r#"{"title": "Hi", "date": "2024-01-01", "layout": "post"}"#,
            "Hello **world**",
        );
        let backend = MockBackend::with_dimensions(10, 10);
        let mut pipeline = Pipeline::new(&site.config, site.root(), &backend);
        let templates = site.templates();

        let posts = build_posts(&site.config, site.root(), &mut pipeline, &templates).unwrap();

        assert_eq!(posts.len(), 1);
        let html = fs::read_to_string(site.root().join("_site/notebook/hi.html")).unwrap();
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<strong>world</strong>"));
    }

    #[test]
    fn unknown_layout_names_document_and_layout() {
        let site = SampleSite::new();
        write_post(
            site.root(),
            "odd.md",
            r#"{"title": "Odd", "date": "2024-01-01", "layout": "gallery"}"#,
            "",
        );
        let backend = MockBackend::with_dimensions(10, 10);
        let mut pipeline = Pipeline::new(&site.config, site.root(), &backend);

        let err = build_posts(&site.config, site.root(), &mut pipeline, &site.templates())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("odd.md"));
        assert!(message.contains("gallery"));
    }

    #[test]
    fn pages_render_with_posts_and_keep_directory() {
        let site = SampleSite::new();
        write_post(site.root(), "a.md", r#"{"title": "Listed", "date": "2024-01-01", "layout": "post"}"#, "");
        write_post(
            site.root(),
            "b.md",
            r#"{"title": "Hidden", "date": "2024-02-01", "layout": "post", "unlisted": true}"#,
            "",
        );
        fs::create_dir_all(site.root().join("about")).unwrap();
        fs::write(
            site.root().join("about/me.html"),
            "{\"title\": \"Me\", \"layout\": \"index\", \"filename\": \"index\"}\n<p>hello</p>",
        )
        .unwrap();
        fs::create_dir_all(site.root().join("_drafts")).unwrap();
        fs::write(site.root().join("_drafts/skip.html"), "not a page").unwrap();

        let backend = MockBackend::with_dimensions(10, 10);
        let mut pipeline = Pipeline::new(&site.config, site.root(), &backend);
        let templates = site.templates();
        let posts = build_posts(&site.config, site.root(), &mut pipeline, &templates).unwrap();
        let pages = build_pages(&site.config, site.root(), &posts, &mut pipeline, &templates).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "/about/index.html");
        let html = fs::read_to_string(site.root().join("_site/about/index.html")).unwrap();
        assert!(html.contains("<li>Listed</li>"));
        assert!(!html.contains("<li>Hidden</li>"));
        assert!(html.contains("<p>hello</p>"));
    }

    #[test]
    fn page_filename_defaults_to_stem() {
        let site = SampleSite::new();
        fs::write(
            site.root().join("contact.html"),
            "{\"layout\": \"index\"}\nmail me",
        )
        .unwrap();
        let pages = discover_pages(&site.config, site.root(), &[]).unwrap();
        assert_eq!(pages[0].filename, "contact.html");
        assert_eq!(pages[0].output, site.root().join("_site/contact.html"));
        assert_eq!(pages[0].date, None);
    }

    #[test]
    fn raw_page_body_is_rendered_verbatim() {
        let site = SampleSite::new();
        fs::write(
            site.root().join("about.html"),
            "{\"title\": \"About\", \"layout\": \"index\", \"raw\": true}\n**not bold**",
        )
        .unwrap();
        let backend = MockBackend::with_dimensions(10, 10);
        let mut pipeline = Pipeline::new(&site.config, site.root(), &backend);

        let pages = build_pages(&site.config, site.root(), &[], &mut pipeline, &site.templates())
            .unwrap();

        assert!(pages[0].raw);
        assert_eq!(pages[0].html, "**not bold**");
        let html = fs::read_to_string(site.root().join("_site/about.html")).unwrap();
        assert!(html.ends_with("</ul>**not bold**"));
    }

    #[test]
    fn configured_directories_are_not_walked_for_pages() {
        let mut site = SampleSite::new();
        site.config.output = "public".into();
        site.config.demos = "demos".into();
        site.config.layouts = "layouts".into();
        for stray in ["public/notebook/hi.html", "demos/plain.html", "layouts/post.html"] {
            let path = site.root().join(stray);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "<p>no header</p>").unwrap();
        }
        fs::write(site.root().join("contact.html"), "{\"layout\": \"index\"}\nmail me").unwrap();

        let pages = discover_pages(&site.config, site.root(), &[]).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].output, site.root().join("public/contact.html"));
    }

    #[test]
    fn colliding_pages_rejected() {
        let site = SampleSite::new();
        fs::write(site.root().join("a.html"), "{\"layout\": \"index\", \"filename\": \"x\"}\n").unwrap();
        fs::write(site.root().join("b.html"), "{\"layout\": \"index\", \"filename\": \"x\"}\n").unwrap();
        let pages = discover_pages(&site.config, site.root(), &[]).unwrap();
        assert!(matches!(
            check_unique_pages(&pages),
            Err(SiteError::DuplicateOutput { .. })
        ));
    }
}
