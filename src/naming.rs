//! Slug and filename derivation.
//!
//! Posts are published under a slug derived from their title, so the title
//! is the identity a reader sees in the URL:
//!
//! - `"Hello, World!"` → `hello-world-`
//! - `"Rust 2024 notes"` → `rust-2024-notes`
//! - `"snake_case-ok"` → `snake_case-ok`
//!
//! Every run of characters outside `[a-z0-9_-]` (after lowercasing) becomes a
//! single dash. Leading and trailing dashes are kept, so two titles that
//! differ only in punctuation still produce distinct slugs where possible.

use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").expect("slug pattern is valid"));

/// Derive a URL-safe slug from free text.
pub fn slugify(text: &str) -> String {
    NON_SLUG_RUN
        .replace_all(&text.to_lowercase(), "-")
        .into_owned()
}

/// Filename for a fresh post stub: `<slug(title)>-<date>.md`.
///
/// The date is kept verbatim (it is already slug-safe in the default format).
pub fn stub_filename(title: &str, date: &str) -> String {
    format!("{}-{}.md", slugify(title), slugify(date))
}
