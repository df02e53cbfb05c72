//! CLI output formatting.
//!
//! Each command that reports back has a `format_*` function returning
//! `Vec<String>` for testability and a `print_*` wrapper that writes to
//! stdout. Format functions do no I/O.
//!
//! # Build summary
//!
//! ```text
//! Posts: 3 (2 listed)
//! Pages: 1
//! Feeds: 2 entries
//! Demos: 4 (2 rendered, 1 copied, 1 folders)
//! Assets
//!     images: 5 files
//!     styles: 2 files
//! Thumbnails: 1 cached, 2 checked (3 total)
//! Output: /home/me/notebook/_site
//! ```

use crate::build::{AssetCopy, BuildReport};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn asset_line(copy: &AssetCopy) -> String {
    let noun = if copy.files == 1 { "file" } else { "files" };
    format!("{}{}: {} {}", indent(1), copy.role.key(), copy.files, noun)
}

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Posts: {} ({} listed)", report.posts, report.listed));
    lines.push(format!("Pages: {}", report.pages));
    lines.push(format!("Feeds: {} entries", report.feed_entries));

    let demos = &report.demos;
    if demos.total() == 0 {
        lines.push("Demos: none".to_string());
    } else {
        lines.push(format!(
            "Demos: {} ({} rendered, {} copied, {} folders)",
            demos.total(),
            demos.rendered,
            demos.copied,
            demos.folders
        ));
    }

    if !report.assets.is_empty() {
        lines.push("Assets".to_string());
        lines.extend(report.assets.iter().map(asset_line));
    }
    if report.thumbnails.total() > 0 {
        lines.push(format!("Thumbnails: {}", report.thumbnails));
    }
    lines.push(format!("Output: {}", report.output.display()));
    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

pub fn format_static_report(copies: &[AssetCopy]) -> Vec<String> {
    if copies.is_empty() {
        return vec!["No static directories to copy".to_string()];
    }
    let mut lines = vec!["Assets".to_string()];
    lines.extend(copies.iter().map(asset_line));
    lines
}

pub fn print_static_report(copies: &[AssetCopy]) {
    for line in format_static_report(copies) {
        println!("{}", line);
    }
}
