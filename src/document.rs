//! Content-document parsing.
//!
//! Every post and page is a single text file: a metadata header followed by
//! the body. Two header conventions are accepted, chosen by how the file
//! starts:
//!
//! ```text
//! {"title": "Hello", "date": "2024-01-01", "layout": "post"}
//! Body text in markdown...
//! ```
//!
//! ```text
//! +++
//! title = "Hello"
//! date = "2024-01-01"
//! layout = "post"
//! +++
//! Body text in markdown...
//! ```
//!
//! The JSON form ends at the first `}` outside a string value. The body is
//! never scanned for a matching brace, so braces in code samples are safe,
//! but the header itself cannot contain nested objects: such headers are
//! rejected with [`DocumentError::NestedBraces`] instead of being cut in the
//! wrong place. Braces inside string values are plain text.
//!
//! Bodies are always trimmed of surrounding whitespace.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker line that opens and closes a fenced TOML header.
pub const FENCE: &str = "+++";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("{path}: document has no metadata header (expected `{{` or `+++`)")]
    MissingHeader { path: PathBuf },
    #[error("{path}: metadata header is never closed")]
    Unterminated { path: PathBuf },
    #[error("{path}:{line}:{column}: nested braces are not supported in a JSON header")]
    NestedBraces {
        path: PathBuf,
        line: usize,
        column: usize,
    },
    #[error("{path}:{line}:{column}: malformed metadata: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("could not serialize metadata: {0}")]
    Serialize(String),
}

/// Which header convention a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    Json,
    Fenced,
}

/// Typed document metadata.
///
/// Known keys are validated here; anything else is kept in `extra` so
/// layouts can still read custom fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Calendar date as written; parsed against the configured date format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Template name, without the `.html` suffix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Explicit output filename for standalone pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Publish the body verbatim, skipping every transform.
    #[serde(default, skip_serializing_if = "is_false")]
    pub raw: bool,
    /// Build the document but keep it out of feeds and listings.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unlisted: bool,
    /// Loose identifiers of related documents (title, slug or path fragment).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A document split into its header and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub style: HeaderStyle,
    /// The header exactly as written, delimiters included.
    pub raw_header: String,
    pub front_matter: FrontMatter,
    /// Everything after the header, trimmed.
    pub body: String,
}

/// Split raw document text into metadata and body.
///
/// `path` is only used to make errors point at the offending file.
pub fn parse_document(source: &str, path: &Path) -> Result<ParsedDocument, DocumentError> {
    let trimmed = source.trim_start();
    if trimmed.starts_with('{') {
        parse_json_header(source, path)
    } else if trimmed.lines().next().map(str::trim_end) == Some(FENCE) {
        parse_fenced_header(source, path)
    } else {
        Err(DocumentError::MissingHeader {
            path: path.to_path_buf(),
        })
    }
}

fn parse_json_header(source: &str, path: &Path) -> Result<ParsedDocument, DocumentError> {
    let open = source.find('{').ok_or_else(|| DocumentError::MissingHeader {
        path: path.to_path_buf(),
    })?;
    let close = match header_end(source, open) {
        HeaderEnd::Close(close) => close,
        HeaderEnd::Nested(at) => {
            let (line, column) = line_col(source, at);
            return Err(DocumentError::NestedBraces {
                path: path.to_path_buf(),
                line,
                column,
            });
        }
        HeaderEnd::Missing => {
            return Err(DocumentError::Unterminated {
                path: path.to_path_buf(),
            });
        }
    };

    let raw_header = &source[..=close];
    let front_matter: FrontMatter =
        serde_json::from_str(raw_header).map_err(|e| DocumentError::Parse {
            path: path.to_path_buf(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?;

    Ok(ParsedDocument {
        style: HeaderStyle::Json,
        raw_header: raw_header.trim_start().to_string(),
        front_matter,
        body: source[close + 1..].trim().to_string(),
    })
}

enum HeaderEnd {
    Close(usize),
    Nested(usize),
    Missing,
}

/// Find the `}` closing the object opened at `open`, skipping string literals.
fn header_end(source: &str, open: usize) -> HeaderEnd {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in source[open + 1..].char_indices() {
        let at = open + 1 + i;
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => return HeaderEnd::Nested(at),
            '}' => return HeaderEnd::Close(at),
            _ => {}
        }
    }
    HeaderEnd::Missing
}

fn parse_fenced_header(source: &str, path: &Path) -> Result<ParsedDocument, DocumentError> {
    let leading = source.len() - source.trim_start().len();
    let after_open = match source[leading..].find('\n') {
        Some(i) => leading + i + 1,
        None => {
            return Err(DocumentError::Unterminated {
                path: path.to_path_buf(),
            });
        }
    };

    // Find the closing fence line.
    let mut offset = after_open;
    let mut close = None;
    for line in source[after_open..].split_inclusive('\n') {
        if line.trim_end() == FENCE {
            close = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let (close_start, close_end) = close.ok_or_else(|| DocumentError::Unterminated {
        path: path.to_path_buf(),
    })?;

    let header_text = &source[after_open..close_start];
    let front_matter: FrontMatter =
        toml::from_str(header_text).map_err(|e| {
            let at = after_open + e.span().map(|s| s.start).unwrap_or(0);
            let (line, column) = line_col(source, at);
            DocumentError::Parse {
                path: path.to_path_buf(),
                line,
                column,
                message: e.message().to_string(),
            }
        })?;

    Ok(ParsedDocument {
        style: HeaderStyle::Fenced,
        raw_header: source[leading..close_end].trim_end().to_string(),
        front_matter,
        body: source[close_end..].trim().to_string(),
    })
}

/// 1-based line and column of a byte offset.
fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map(|nl| before[nl + 1..].chars().count())
        .unwrap_or_else(|| before.chars().count())
        + 1;
    (line, column)
}

/// Serialize metadata and body back into document text using `style`.
///
/// Parsing the result yields the same front matter and body.
pub fn render_document(
    style: HeaderStyle,
    front_matter: &FrontMatter,
    body: &str,
) -> Result<String, DocumentError> {
    let header = match style {
        HeaderStyle::Json => serde_json::to_string_pretty(front_matter)
            .map_err(|e| DocumentError::Serialize(e.to_string()))?,
        HeaderStyle::Fenced => {
            let table = toml::to_string(front_matter)
                .map_err(|e| DocumentError::Serialize(e.to_string()))?;
            format!("{FENCE}\n{table}{FENCE}")
        }
    };
    Ok(format!("{header}\n\n{body}\n"))
}
