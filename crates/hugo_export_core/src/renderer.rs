use std::sync::LazyLock;

use regex::Regex;

use crate::model::Post;
use crate::store::ContentRenderer;

/// Renderer that returns the stored content untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughRenderer;

impl ContentRenderer for PassthroughRenderer {
    fn render(&self, post: &Post) -> String {
        post.content.clone()
    }
}

static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

static BLOCK_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^<(?:p|div|h[1-6]|ul|ol|li|dl|blockquote|pre|table|figure|hr|form|section|article|aside|header|footer|nav|address|iframe|!--)[\s>/]",
    )
    .unwrap()
});

/// Paragraph-only take on the editor's auto-formatting: blank-line separated
/// blocks become `<p>` elements and single newlines inside them become
/// `<br />`. Blocks that already start with a block-level tag are kept as is.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParagraphRenderer;

impl ParagraphRenderer {
    pub fn render_text(&self, raw: &str) -> String {
        let normalized = raw.replace("\r\n", "\n");
        BLANK_LINES_RE
            .split(&normalized)
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                if BLOCK_START_RE.is_match(block) {
                    block.to_string()
                } else {
                    format!("<p>{}</p>", block.replace('\n', "<br />\n"))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ContentRenderer for ParagraphRenderer {
    fn render(&self, post: &Post) -> String {
        self.render_text(&post.content)
    }
}

#[cfg(test)]
mod tests {
    use super::ParagraphRenderer;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_lines_split_paragraphs() {
        let raw = "First line\nsecond line\n\nNext paragraph\r\n\r\n<h2>Heading</h2>";
        assert_eq!(
            ParagraphRenderer.render_text(raw),
            "<p>First line<br />\nsecond line</p>\n<p>Next paragraph</p>\n<h2>Heading</h2>"
        );
    }

    #[test]
    fn inline_markup_is_wrapped() {
        assert_eq!(
            ParagraphRenderer.render_text("<strong>bold</strong> start"),
            "<p><strong>bold</strong> start</p>"
        );
    }
}
