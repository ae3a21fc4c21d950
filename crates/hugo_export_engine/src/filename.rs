use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use url::Url;

/// Per-run directory name: `wp-hugo-{host}{path}-{hash}`, where the hash is
/// derived from the run start time.
pub fn run_directory_name(site_url: &str, started: DateTime<Utc>) -> String {
    let (host, path) = match Url::parse(site_url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or_default().to_string(),
            parsed.path().to_string(),
        ),
        Err(_) => (String::new(), String::new()),
    };
    let path = path.trim_end_matches('/');
    let sanitized_path: String = path
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let hash = short_hash(&started.timestamp_nanos_opt().unwrap_or_default().to_string());
    format!("wp-hugo-{host}{sanitized_path}-{hash}")
}

/// Bundle filename for media fetched from another host: `{host}-{basename}`.
pub fn remote_asset_filename(host: &str, basename: &str) -> String {
    safe_filename(&format!("{}-{}", sanitize_with_dashes(host), basename))
}

/// Lowercase, ASCII alphanumerics and `_` kept, everything else a single `-`.
pub fn sanitize_with_dashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Make a filename safe on every platform the export may be unpacked on.
pub fn safe_filename(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "untitled".to_string();
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.insert(0, '_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    let stem = name.split('.').next().unwrap_or(name);
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(stem))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
