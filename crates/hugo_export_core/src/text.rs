//! Small string helpers shared by the metadata and asset stages.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

pub fn decode_entities(text: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(text)
}

/// Form-style url decoding: `+` becomes a space, invalid UTF-8 is replaced.
pub fn url_decode(text: &str) -> String {
    let spaced = text.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Url-decode then entity-decode, the normalization applied to stored slugs.
pub fn decode_slug(text: &str) -> String {
    decode_entities(&url_decode(text)).into_owned()
}

/// Last path segment, ignoring trailing slashes.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Parent of a `/`-separated path; `/` for top-level entries.
pub fn dirname(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &trimmed[..idx],
    }
}

/// Join a directory and a segment with exactly one `/` between them.
pub fn join_path(dir: &str, segment: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), segment.trim_start_matches('/'))
}

/// Lowercased extension of the last path segment, if any.
pub fn extension(path: &str) -> Option<String> {
    let name = basename(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Strip `http://` or `https://` from the front of a URL.
pub fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "ftp", "ftps"];

/// Sanitize a user-supplied URL for display: drop characters that have no
/// place in a URL, default to `http://`, reject unknown schemes, and encode
/// `&` and `'` as numeric entities.
pub fn escape_url(url: &str) -> String {
    let cleaned: String = url
        .trim()
        .chars()
        .filter(|c| is_url_char(*c))
        .collect();
    if cleaned.is_empty() {
        return String::new();
    }

    let with_scheme = match cleaned.split_once(':') {
        Some((scheme, _)) if is_scheme(scheme) => {
            if !ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
                return String::new();
            }
            cleaned
        }
        _ if cleaned.starts_with(&['/', '#', '?'][..]) => cleaned,
        _ => format!("http://{cleaned}"),
    };

    with_scheme
        .replace("&amp;", "&")
        .replace('&', "&#038;")
        .replace('\'', "&#039;")
}

fn is_url_char(c: char) -> bool {
    !c.is_ascii() || c.is_ascii_alphanumeric() || "-~+_.?#=!&;,/:%@$|*'()[]".contains(c)
}

fn is_scheme(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+.-".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_url_sanitizes_author_links() {
        assert_eq!(
            escape_url(" https://example.com/?a=1&b=2 "),
            "https://example.com/?a=1&#038;b=2"
        );
        assert_eq!(escape_url("example.com/me"), "http://example.com/me");
        assert_eq!(escape_url("javascript:alert(1)"), "");
        assert_eq!(escape_url("https://exa mple.com/<x>"), "https://example.com/x");
        assert_eq!(escape_url(""), "");
    }

    #[test]
    fn url_decode_handles_plus_and_percent() {
        assert_eq!(url_decode("caf%C3%A9+au+lait"), "café au lait");
    }

    #[test]
    fn decode_slug_applies_both_layers() {
        assert_eq!(decode_slug("rock%26amp%3Broll"), "rock&roll");
    }

    #[test]
    fn path_helpers() {
        assert_eq!(basename("/2020/01/hello/"), "hello");
        assert_eq!(basename("a.png"), "a.png");
        assert_eq!(dirname("/2020/01/hello/"), "/2020/01");
        assert_eq!(dirname("/hello/"), "/");
        assert_eq!(join_path("/", "old"), "/old");
        assert_eq!(join_path("/2020/", "old"), "/2020/old");
        assert_eq!(extension("/wp-content/uploads/Photo.JPG"), Some("jpg".to_string()));
        assert_eq!(extension("/about/"), None);
        assert_eq!(extension("/.htaccess"), None);
        assert_eq!(strip_scheme("https://example.com/x"), "example.com/x");
    }
}
