//! Syndication feeds.
//!
//! Two feeds are written at the output root from the listed posts, newest
//! first: `rss.xml` (RSS 2.0, built with the `rss` crate) and `atom.xml`
//! (Atom 1.0). Both share the site's title, description and base URL.
//!
//! Each entry is keyed by the post's canonical URL,
//! `<site.url>/notebook/<slug>`, and links to the rendered page. Posts carry
//! a date but no time, so published and updated timestamps are midnight UTC.
//!
//! # Atom format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <feed xmlns="http://www.w3.org/2005/Atom">
//!   <id>https://example.com/</id>
//!   <title>Notebook</title>
//!   <updated>2024-01-01T00:00:00+00:00</updated>
//!   <entry>
//!     <id>https://example.com/notebook/hi</id>
//!     <title>Hi</title>
//!     <link href="https://example.com/notebook/hi.html"/>
//!     <published>2024-01-01T00:00:00+00:00</published>
//!     <updated>2024-01-01T00:00:00+00:00</updated>
//!   </entry>
//! </feed>
//! ```

use crate::config::{POSTS_OUTPUT_DIR, SiteConfig, SiteMeta};
use crate::files::{FileError, write_file};
use crate::site::{Post, listed};
use chrono::{DateTime, NaiveDate, Utc};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder, validation::Validate};
use std::path::Path;
use thiserror::Error;

pub const RSS_FILENAME: &str = "rss.xml";
pub const ATOM_FILENAME: &str = "atom.xml";

/// XML namespace for Atom
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("rss validation failed: {0}")]
    Invalid(String),
    #[error(transparent)]
    File(#[from] FileError),
}

/// One feed entry, shared by both formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub published: DateTime<Utc>,
    pub content: String,
}

/// Midnight UTC on `date`.
fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Entries for every listed post, in the given order.
pub fn entries(site: &SiteMeta, posts: &[Post]) -> Vec<FeedEntry> {
    let base = site.base_url();
    listed(posts)
        .into_iter()
        .map(|post| FeedEntry {
            id: format!("{base}/{POSTS_OUTPUT_DIR}/{}", post.slug),
            title: post.title.clone(),
            link: format!("{base}{}", post.url),
            published: midnight(post.date),
            content: post.html.clone(),
        })
        .collect()
}

/// RSS 2.0 document.
pub fn rss_xml(site: &SiteMeta, entries: &[FeedEntry]) -> Result<String, FeedError> {
    let items: Vec<rss::Item> = entries
        .iter()
        .map(|entry| {
            ItemBuilder::default()
                .title(Some(entry.title.clone()))
                .link(Some(entry.link.clone()))
                .guid(
                    GuidBuilder::default()
                        .permalink(false)
                        .value(entry.id.clone())
                        .build(),
                )
                .pub_date(Some(entry.published.to_rfc2822()))
                .description(Some(entry.content.clone()))
                .build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(&site.title)
        .link(format!("{}/", site.base_url()))
        .description(&site.description)
        .generator(Some(format!("lead {}", env!("CARGO_PKG_VERSION"))))
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| FeedError::Invalid(e.to_string()))?;
    Ok(channel.to_string())
}

/// Atom 1.0 document.
pub fn atom_xml(site: &SiteMeta, entries: &[FeedEntry]) -> String {
    let base = site.base_url();
    let updated = entries
        .iter()
        .map(|e| e.published)
        .max()
        .unwrap_or_else(|| midnight(Utc::now().date_naive()));

    let mut xml = String::with_capacity(1024 + entries.len() * 512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<feed xmlns="{ATOM_NS}">"#));
    xml.push('\n');
    xml.push_str(&format!("  <id>{}/</id>\n", escape_xml(base)));
    xml.push_str(&format!("  <title>{}</title>\n", escape_xml(&site.title)));
    if !site.description.is_empty() {
        xml.push_str(&format!(
            "  <subtitle>{}</subtitle>\n",
            escape_xml(&site.description)
        ));
    }
    xml.push_str(&format!(
        "  <link href=\"{}/\"/>\n",
        escape_xml(base)
    ));
    xml.push_str(&format!(
        "  <link rel=\"self\" href=\"{}/{ATOM_FILENAME}\"/>\n",
        escape_xml(base)
    ));
    xml.push_str(&format!("  <updated>{}</updated>\n", updated.to_rfc3339()));
    if !site.author.is_empty() {
        xml.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&site.author)
        ));
    }

    for entry in entries {
        let stamp = entry.published.to_rfc3339();
        xml.push_str("  <entry>\n");
        xml.push_str(&format!("    <id>{}</id>\n", escape_xml(&entry.id)));
        xml.push_str(&format!("    <title>{}</title>\n", escape_xml(&entry.title)));
        xml.push_str(&format!("    <link href=\"{}\"/>\n", escape_xml(&entry.link)));
        xml.push_str(&format!("    <published>{stamp}</published>\n"));
        xml.push_str(&format!("    <updated>{stamp}</updated>\n"));
        xml.push_str(&format!(
            "    <content type=\"html\">{}</content>\n",
            escape_xml(&entry.content)
        ));
        xml.push_str("  </entry>\n");
    }

    xml.push_str("</feed>\n");
    xml
}

/// Write both feeds to the output root. Returns the number of entries.
pub fn write_feeds(config: &SiteConfig, root: &Path, posts: &[Post]) -> Result<usize, FeedError> {
    let entries = entries(&config.site, posts);
    let out = config.output_root(root);
    write_file(&out.join(RSS_FILENAME), &rss_xml(&config.site, &entries)?)?;
    write_file(&out.join(ATOM_FILENAME), &atom_xml(&config.site, &entries))?;
    log::info!("Wrote feeds with {} entries", entries.len());
    Ok(entries.len())
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
