use std::sync::LazyLock;

use hugo_export_core::text::decode_entities;
use regex::Regex;

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> String {
        html2md::parse_html(html)
    }
}

static INNER_INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<div class="contents innerindex">.*?</div>"#).unwrap());

/// Marker html2md leaves behind when it mangles reference-style links.
const MALFORMED_LINK_MARKER: &str = "[]: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    Markdown,
    /// Conversion produced broken output; the body is entity-decoded HTML.
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedContent {
    pub body: String,
    pub format: ContentFormat,
}

/// Turn rendered post HTML into a Markdown body, keeping the HTML when the
/// converter produces malformed reference links.
pub fn convert_content(converter: &dyn Converter, html: &str) -> ConvertedContent {
    let stripped = INNER_INDEX_RE.replace_all(html, "");
    let decoded = decode_entities(&stripped).into_owned();
    let markdown = converter.to_markdown(&decoded);
    if markdown.contains(MALFORMED_LINK_MARKER) {
        export_logging::export_warn!("markdown conversion produced malformed links; keeping html");
        return ConvertedContent {
            body: decoded,
            format: ContentFormat::Html,
        };
    }
    ConvertedContent {
        body: markdown,
        format: ContentFormat::Markdown,
    }
}
