//! Shared test utilities.
//!
//! [`SampleSite`] lays out a minimal project in a temp directory: stock
//! config, a posts directory and three small layouts. Tests add the content
//! they care about on top.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let site = SampleSite::new();
//! write_post(site.root(), "hi.md", r#"{"title": "Hi", "date": "2024-01-01", "layout": "post"}"#, "Hello");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::templates::Templates;

/// `post.html`: title heading followed by the rendered body.
pub const POST_LAYOUT: &str =
    "<h1>{{ post.title }}</h1>{% for r in post.related %}<a href=\"{{ r.url }}\">{{ r.title }}</a>{% endfor %}{{ post.html }}";

/// `index.html`: one list item per listed post, then the page body.
pub const INDEX_LAYOUT: &str =
    "<ul>{% for p in posts %}<li>{{ p.title }}</li>{% endfor %}</ul>{{ page.html }}";

/// `demo.html`: the three demo fields plus the highlighted script.
pub const DEMO_LAYOUT: &str =
    "<style>{{ css }}</style>{{ html }}<script>{{ js }}</script>{{ fmt_js }}";

pub struct SampleSite {
    tmp: TempDir,
    pub config: SiteConfig,
}

impl SampleSite {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("_log")).unwrap();
        fs::create_dir_all(root.join("_layouts")).unwrap();
        fs::write(root.join("_layouts/post.html"), POST_LAYOUT).unwrap();
        fs::write(root.join("_layouts/index.html"), INDEX_LAYOUT).unwrap();
        fs::write(root.join("_layouts/demo.html"), DEMO_LAYOUT).unwrap();
        Self {
            tmp,
            config: SiteConfig::default(),
        }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn templates(&self) -> Templates {
        Templates::load(&self.root().join("_layouts")).unwrap()
    }
}

/// Write a post document `<header>\n<body>` into `_log/<name>`.
pub fn write_post(root: &Path, name: &str, header: &str, body: &str) {
    let path = root.join("_log").join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, format!("{header}\n{body}\n")).unwrap();
}

/// Write a file (and its parents) under the project root.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
