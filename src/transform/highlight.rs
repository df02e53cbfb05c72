//! Fenced code highlighting.
//!
//! A block is three backticks, a language tag, a newline, the code, and
//! three closing backticks:
//!
//! ````text
//! ```python
//! print("hi")
//! ```
//! ````
//!
//! Each block becomes a two-column table (line numbers, then the code as
//! class-annotated spans) inside `<div class="code-block">`. Colours come
//! from the site stylesheet, so no theme is baked in. The whole block is
//! emitted on a single line, newlines encoded as `&#10;`, which keeps the
//! markdown converter from splitting it at blank lines inside the code.

use super::TransformError;
use maud::{PreEscaped, html};
use regex::Regex;
use std::sync::LazyLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// A fenced block: language tag in group 1, code in group 2.
pub(crate) static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(\w+)\s*\n+(.*?)```").expect("code block pattern is valid")
});

pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn syntax(&self, lang: &str) -> Result<&SyntaxReference, TransformError> {
        self.syntaxes
            .find_syntax_by_token(lang)
            .ok_or_else(|| TransformError::UnknownLanguage {
                lang: lang.to_string(),
            })
    }

    /// Class-annotated spans for `code`, without any wrapper.
    pub fn spans(&self, code: &str, lang: &str) -> Result<String, TransformError> {
        let syntax = self.syntax(lang)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        let mut source = code.to_string();
        if !source.ends_with('\n') {
            source.push('\n');
        }
        for line in LinesWithEndings::from(&source) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| TransformError::Highlight {
                    lang: lang.to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(generator.finalize())
    }

    /// Full code-block markup for one snippet, on a single line.
    pub fn block(&self, code: &str, lang: &str) -> Result<String, TransformError> {
        let code = code.trim();
        let spans = self.spans(code, lang)?;
        let line_count = code.lines().count().max(1);
        let numbers = (1..=line_count)
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("\n");

        let markup = html! {
            div class="code-block" {
                table class="sourcetable" {
                    tr {
                        td class="linenos" { div class="linenodiv" { pre { (numbers) } } }
                        td class="code" { div class="source" { pre { (PreEscaped(spans.trim_end())) } } }
                    }
                }
            }
        };
        Ok(markup.into_string().replace('\n', "&#10;"))
    }

    /// Replace every fenced block in `text` with highlighted markup.
    ///
    /// Blocks are set off by blank lines so the markdown pass sees each one
    /// as a standalone HTML block.
    pub fn highlight_blocks(&self, text: &str) -> Result<String, TransformError> {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in CODE_BLOCK.captures_iter(text) {
            let (Some(whole), Some(lang), Some(code)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            out.push_str("\n\n");
            out.push_str(&self.block(code.as_str(), lang.as_str())?);
            out.push_str("\n\n");
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}
