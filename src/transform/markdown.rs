//! Markdown to HTML.

use pulldown_cmark::{Options, Parser, html as md_html};

/// Convert markdown to HTML. Raw HTML in the input is passed through.
pub fn to_html(text: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(text, options);
    let mut html = String::with_capacity(text.len() * 3 / 2);
    md_html::push_html(&mut html, parser);
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emphasis_and_paragraphs() {
        assert_eq!(
            to_html("Hello **world**\n\nAgain"),
            "<p>Hello <strong>world</strong></p>\n<p>Again</p>\n"
        );
    }

    #[test]
    fn html_blocks_pass_through() {
        let html = to_html("<div class=\"x\">*kept*</div>\n\ntext");
        assert!(html.contains("<div class=\"x\">*kept*</div>"));
    }

    #[test]
    fn tables_enabled() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }
}
