//! Final on-disk layout of a post bundle.

use std::path::{Path, PathBuf};

use hugo_export_core::{post_slug, Document, FrontMatter, Post};

use crate::comments::COMMENTS_FILENAME;
use crate::persist::{FileStore, PersistError};
use crate::resolver::RewriteLedger;

pub const INDEX_FILENAME: &str = "index.md";
pub const MEDIA_LEDGER_FILENAME: &str = "media.yaml";

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("failed to serialize {file}: {source}")]
    Yaml {
        file: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
}

/// Bundle directory: `{root}/{slug}` for pages,
/// `{root}/{posts_folder}/{YYYY-MM-DD}-{slug}` for posts (local publish date).
/// A post without a slug is placed under its id.
pub fn destination_dir(root: &Path, posts_folder: &str, post: &Post) -> PathBuf {
    let mut slug = post_slug(post);
    if slug.is_empty() {
        export_logging::export_warn!("post {} has no slug, using its id", post.id);
        slug = post.id.to_string();
    }
    if post.is_page() {
        root.join(slug)
    } else {
        root.join(posts_folder)
            .join(format!("{}-{slug}", post.date.format("%Y-%m-%d")))
    }
}

/// Replace every ledger URL, and its `&amp;` spelling, with its bundle
/// filename. Longer URLs go first so a URL never clobbers a longer one
/// it is a prefix of.
pub fn rewrite_media(body: &str, ledger: &RewriteLedger) -> String {
    let mut entries: Vec<(&str, &str)> = ledger.iter().collect();
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

    let mut rewritten = body.to_string();
    for (url, filename) in entries {
        let escaped = url.replace('&', "&amp;");
        if escaped != url {
            rewritten = rewritten.replace(&escaped, filename);
        }
        rewritten = rewritten.replace(url, filename);
    }
    rewritten
}

/// Everything written for one post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostBundle {
    pub dir: PathBuf,
    pub index: Document,
    pub comments: Option<Document>,
    /// Asset ledgers written as a sidecar instead of into the front matter.
    pub media_ledger: Option<FrontMatter>,
}

/// Write `index.md` plus the optional `comments.md` and `media.yaml`.
/// Returns the path of `index.md`.
pub fn write_post(files: &dyn FileStore, bundle: &PostBundle) -> Result<PathBuf, AssembleError> {
    let index = render(&bundle.index, INDEX_FILENAME)?;
    let index_path = write(files, &bundle.dir, INDEX_FILENAME, &index)?;

    if let Some(comments) = &bundle.comments {
        let text = render(comments, COMMENTS_FILENAME)?;
        write(files, &bundle.dir, COMMENTS_FILENAME, &text)?;
    }

    if let Some(ledger) = bundle.media_ledger.as_ref().filter(|ledger| !ledger.is_empty()) {
        let yaml = ledger.to_yaml().map_err(|source| AssembleError::Yaml {
            file: MEDIA_LEDGER_FILENAME,
            source,
        })?;
        write(files, &bundle.dir, MEDIA_LEDGER_FILENAME, &yaml)?;
    }

    Ok(index_path)
}

fn render(document: &Document, file: &'static str) -> Result<String, AssembleError> {
    document
        .render()
        .map_err(|source| AssembleError::Yaml { file, source })
}

fn write(
    files: &dyn FileStore,
    dir: &Path,
    filename: &str,
    contents: &str,
) -> Result<PathBuf, AssembleError> {
    let path = dir.join(filename);
    files
        .write(&path, contents.as_bytes())
        .map_err(|source| AssembleError::Persist {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use hugo_export_core::{PostStatus, PostType};
    use pretty_assertions::assert_eq;

    fn post(id: u64, post_type: PostType, slug: &str) -> Post {
        Post {
            id,
            post_type,
            status: PostStatus::Draft,
            title: String::new(),
            slug: slug.to_string(),
            author_id: 1,
            date: DateTime::parse_from_rfc3339("2020-01-02T23:30:00-05:00").unwrap(),
            excerpt: String::new(),
            content: String::new(),
            guid: String::new(),
            permalink: String::new(),
            thumbnail_id: None,
        }
    }

    #[test]
    fn pages_and_posts_get_their_own_directories() {
        let root = Path::new("/out");
        assert_eq!(
            destination_dir(root, "post", &post(1, PostType::Page, "about")),
            PathBuf::from("/out/about")
        );
        assert_eq!(
            destination_dir(root, "post", &post(2, PostType::Post, "hello")),
            PathBuf::from("/out/post/2020-01-02-hello")
        );
    }

    #[test]
    fn missing_slugs_fall_back_to_the_id() {
        let root = Path::new("/out");
        assert_eq!(
            destination_dir(root, "post", &post(41, PostType::Page, "")),
            PathBuf::from("/out/41")
        );
        assert_eq!(
            destination_dir(root, "post", &post(42, PostType::Page, "")),
            PathBuf::from("/out/42")
        );
        assert_eq!(
            destination_dir(root, "post", &post(43, PostType::Post, "")),
            PathBuf::from("/out/post/2020-01-02-43")
        );
    }

    #[test]
    fn longer_urls_are_rewritten_first() {
        let mut ledger = RewriteLedger::new();
        ledger.insert("https://a.test/img/x.png", "x.png");
        ledger.insert("https://a.test/img/x.png?w=1&h=2", "x-small.png");
        let body = "<img src=\"https://a.test/img/x.png?w=1&amp;h=2\"> <a href=\"https://a.test/img/x.png\">";
        assert_eq!(
            rewrite_media(body, &ledger),
            "<img src=\"x-small.png\"> <a href=\"x.png\">"
        );
    }

    #[test]
    fn empty_ledger_leaves_body_alone() {
        assert_eq!(rewrite_media("body", &RewriteLedger::new()), "body");
    }
}
