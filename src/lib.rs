//! # Lead
//!
//! A small static site generator for a personal notebook. Posts are markdown
//! documents with a metadata header, layouts are Tera templates, and the
//! output is a plain directory tree that any file server can host.
//!
//! # Build pipeline
//!
//! A build is one synchronous run through a fixed sequence of states
//! (see [`build`]):
//!
//! ```text
//! config.toml ──► SiteConfig
//!                    │
//! _log/*.md ──► parse ──► link "also" ──► order ──► transform ──► render ──► _site/notebook/
//!                                                      │                └──► rss.xml, atom.xml
//! **/*.html pages ──────────────────────────► transform ──► render ──► _site/**
//! _demos/ ──► render / copy ──► _site/demos/
//! _images/ _styles/ _scripts/ ──► copy ──► _site/images/ ...
//! ```
//!
//! The body transform ([`transform`]) runs three stages in order: bare image
//! file names become linked `<img>` tags (with thumbnails for large photos),
//! fenced code blocks are syntax-highlighted, then markdown becomes HTML.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading over stock defaults, directory roles, output naming |
//! | [`document`] | Metadata header parsing (JSON object or `+++` TOML) and re-serialization |
//! | [`naming`] | Slugs and stub file names |
//! | [`walk`] | Directory walk with injected directory/file predicates |
//! | [`transform`] | Image references, code highlighting, markdown |
//! | [`imaging`] | Thumbnail generation behind the [`imaging::ImageBackend`] trait |
//! | [`cache`] | Content-hash cache of generated thumbnails |
//! | [`templates`] | Named layouts loaded once per build |
//! | [`site`] | Posts and pages: discovery, linking, ordering, rendering |
//! | [`demos`] | Structured, standalone and folder demos |
//! | [`feed`] | RSS 2.0 and Atom feeds |
//! | [`files`] | Output writes, copies and removals |
//! | [`build`] | The build state machine and the static-asset refresh |
//! | [`commands`] | `new`, `push` and usage text |
//! | [`serve`] | Local preview server |
//! | [`watch`] | Live rebuild loop |
//! | [`output`] | Terminal summaries |
//! | [`logger`] | Logger setup |
//!
//! # Design Decisions
//!
//! ## No Global State
//!
//! The resolved [`config::SiteConfig`] and the [`templates::Templates`] set
//! are built once per run and passed by reference into every stage. Nothing
//! is read from ambient statics, so tests can build several sites side by
//! side in temp directories.
//!
//! ## Failing Loudly
//!
//! A malformed header, an unparseable date or a missing layout aborts the
//! build with the offending path. A site silently missing a post is worse
//! than a failed build. Only advisory things degrade quietly: an `also`
//! reference that matches nothing is dropped, and a missing demos directory
//! just means no demos.

pub mod build;
pub mod cache;
pub mod commands;
pub mod config;
pub mod demos;
pub mod document;
pub mod feed;
pub mod files;
pub mod imaging;
pub mod logger;
pub mod naming;
pub mod output;
pub mod serve;
pub mod site;
pub mod templates;
pub mod transform;
pub mod walk;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
