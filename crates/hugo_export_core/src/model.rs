use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::text::{basename, decode_slug};
use crate::transliterate::transliterate;

pub type PostId = u64;
pub type CommentId = u64;
pub type AuthorId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Post,
    Page,
    #[serde(other)]
    Other,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Post => "post",
            PostType::Page => "page",
            PostType::Other => "other",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Publish,
    Draft,
    Private,
    #[serde(other)]
    Other,
}

impl PostStatus {
    /// Statuses that take part in an export run.
    pub fn is_exported(&self) -> bool {
        !matches!(self, PostStatus::Other)
    }
}

/// A post or page as read from the content store. Never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub status: PostStatus,
    pub title: String,
    /// Raw `post_name`, possibly url-encoded.
    pub slug: String,
    pub author_id: AuthorId,
    /// Publish time in the site's local offset.
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub guid: String,
    /// Absolute canonical URL.
    pub permalink: String,
    #[serde(default)]
    pub thumbnail_id: Option<PostId>,
}

impl Post {
    pub fn is_page(&self) -> bool {
        self.post_type == PostType::Page
    }

    pub fn date_utc(&self) -> DateTime<Utc> {
        self.date.with_timezone(&Utc)
    }

    /// ISO-8601 UTC publish time, e.g. `2020-01-02T10:00:00+00:00`.
    pub fn iso_date(&self) -> String {
        iso_utc(&self.date)
    }

    /// Publish time as a web-archive memento timestamp (`YYYYMMDDhhmmss`, UTC).
    pub fn memento_timestamp(&self) -> String {
        self.date_utc().format("%Y%m%d%H%M%S").to_string()
    }
}

pub fn iso_utc(date: &DateTime<FixedOffset>) -> String {
    date.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub author_url: String,
    pub date: DateTime<FixedOffset>,
    pub content: String,
    #[serde(rename = "type", default = "default_comment_type")]
    pub comment_type: String,
    #[serde(default = "default_approved")]
    pub approved: bool,
}

impl Comment {
    /// Approved, plain comments only: pingbacks and trackbacks are left out.
    pub fn is_exportable(&self) -> bool {
        self.approved && (self.comment_type == "comment" || self.comment_type.is_empty())
    }
}

fn default_comment_type() -> String {
    "comment".to_string()
}

fn default_approved() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: PostId,
    pub parent_id: PostId,
    #[serde(default)]
    pub title: String,
    /// Absolute path of the stored file.
    pub file: PathBuf,
    pub url: String,
}

impl Attachment {
    /// Name of the copied file inside the post bundle.
    pub fn bundle_filename(&self) -> String {
        let stored = self.file.to_string_lossy();
        transliterate(&decode_slug(basename(&stored)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetOutcome {
    LocalCopied,
    RemoteFetched,
    ArchiveRecovered,
    Lost,
}

impl fmt::Display for AssetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetOutcome::LocalCopied => write!(f, "local-copied"),
            AssetOutcome::RemoteFetched => write!(f, "remote-fetched"),
            AssetOutcome::ArchiveRecovered => write!(f, "archive-recovered"),
            AssetOutcome::Lost => write!(f, "lost"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub url: String,
    pub outcome: AssetOutcome,
    pub filename: String,
}
