use std::sync::LazyLock;

use regex::Regex;

// Bounded by whitespace, angle brackets and double quotes; one level of
// nested parentheses is allowed anywhere in the URL, and the last character
// must be a closing paren, a slash or a non-punctuation character.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bhttps?://(?:[^\s()<>"]+|\((?:[^\s()<>"]+|\([^\s()<>"]+\))*\))+(?:\((?:[^\s()<>"]+|\([^\s()<>"]+\))*\)|[^[:punct:]\s]|/)"#,
    )
    .unwrap()
});

/// All `http(s)` URLs embedded in rendered content, sorted and deduplicated.
pub fn find_urls(rendered: &str) -> Vec<String> {
    let mut urls: Vec<String> = URL_RE
        .find_iter(rendered)
        .map(|m| m.as_str().to_string())
        .collect();
    urls.sort();
    urls.dedup();
    urls
}

#[cfg(test)]
mod tests {
    use super::find_urls;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_urls_yields_empty() {
        assert!(find_urls("plain text, no links").is_empty());
        assert!(find_urls("").is_empty());
    }

    #[test]
    fn html_attributes_are_bounded_by_quotes() {
        let html = r#"<p><img src="https://example.com/a.png"/> <a href="http://example.com/b.pdf">b</a></p>"#;
        assert_eq!(
            find_urls(html),
            vec!["http://example.com/b.pdf", "https://example.com/a.png"]
        );
    }

    #[test]
    fn output_is_sorted_and_deduplicated() {
        let text = "see https://z.example/x and https://a.example/y and https://z.example/x";
        assert_eq!(find_urls(text), vec!["https://a.example/y", "https://z.example/x"]);
    }

    #[test]
    fn trailing_punctuation_is_dropped() {
        assert_eq!(
            find_urls("Visit https://example.com/page. Then https://example.com/other, ok?"),
            vec!["https://example.com/other", "https://example.com/page"]
        );
    }

    #[test]
    fn parentheses_are_balanced() {
        assert_eq!(
            find_urls("[pic](https://example.com/pic.jpg) and (see https://en.wikipedia.org/wiki/Rust_(language))"),
            vec![
                "https://en.wikipedia.org/wiki/Rust_(language)",
                "https://example.com/pic.jpg",
            ]
        );
    }

    #[test]
    fn trailing_slash_is_kept() {
        assert_eq!(find_urls("<https://example.com/dir/>"), vec!["https://example.com/dir/"]);
    }
}
