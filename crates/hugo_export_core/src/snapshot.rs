//! In-memory content store, loadable from a JSON dump of a site.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Attachment, AuthorId, Comment, Post, PostId, PostType};
use crate::store::{ContentStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSnapshot {
    pub home_url: String,
    /// Empty means "same as the home URL".
    #[serde(default)]
    pub site_url: String,
    #[serde(default)]
    pub options: Vec<SiteOption>,
    #[serde(default)]
    pub authors: BTreeMap<AuthorId, String>,
    /// Empty means the stock WordPress taxonomies.
    #[serde(default)]
    pub taxonomies: Vec<TaxonomyDef>,
    #[serde(default)]
    pub posts: Vec<SnapshotPost>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyDef {
    pub name: String,
    pub object_types: Vec<PostType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub key: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPost {
    #[serde(flatten)]
    pub post: Post,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    /// Taxonomy name to term names, in assignment order.
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<String>>,
}

impl SnapshotPost {
    pub fn new(post: Post) -> Self {
        Self {
            post,
            custom_fields: Vec::new(),
            terms: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: &str, values: &[&str]) -> Self {
        self.custom_fields.push(CustomField {
            key: key.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn with_terms(mut self, taxonomy: &str, terms: &[&str]) -> Self {
        self.terms.insert(
            taxonomy.to_string(),
            terms.iter().map(|t| t.to_string()).collect(),
        );
        self
    }
}

impl SiteSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a JSON dump from disk.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path)
            .map_err(|err| StoreError::Backend(format!("{}: {err}", path.display())))?;
        let snapshot = Self::from_json(&json)
            .map_err(|err| StoreError::Backend(format!("{}: {err}", path.display())))?;
        export_logging::export_debug!(
            "loaded snapshot {} with {} posts",
            path.display(),
            snapshot.posts.len()
        );
        Ok(snapshot)
    }

    fn find(&self, id: PostId) -> Result<&SnapshotPost, StoreError> {
        self.posts
            .iter()
            .find(|entry| entry.post.id == id)
            .ok_or(StoreError::PostNotFound(id))
    }
}

fn default_taxonomies(post_type: PostType) -> Vec<String> {
    match post_type {
        PostType::Post => vec![
            "category".to_string(),
            "post_tag".to_string(),
            "post_format".to_string(),
        ],
        PostType::Page | PostType::Other => Vec::new(),
    }
}

impl ContentStore for SiteSnapshot {
    fn post_ids(&self) -> Result<Vec<PostId>, StoreError> {
        Ok(self
            .posts
            .iter()
            .map(|entry| &entry.post)
            .filter(|post| post.status.is_exported())
            .filter(|post| matches!(post.post_type, PostType::Post | PostType::Page))
            .map(|post| post.id)
            .collect())
    }

    fn post(&self, id: PostId) -> Result<Post, StoreError> {
        self.find(id).map(|entry| entry.post.clone())
    }

    fn author_display_name(&self, id: AuthorId) -> Result<String, StoreError> {
        self.authors
            .get(&id)
            .cloned()
            .ok_or(StoreError::AuthorNotFound(id))
    }

    fn home_url(&self) -> &str {
        self.home_url.trim_end_matches('/')
    }

    fn site_url(&self) -> &str {
        if self.site_url.is_empty() {
            self.home_url()
        } else {
            self.site_url.trim_end_matches('/')
        }
    }

    fn custom_fields(&self, id: PostId) -> Result<Vec<(String, Vec<String>)>, StoreError> {
        Ok(self
            .find(id)?
            .custom_fields
            .iter()
            .map(|field| (field.key.clone(), field.values.clone()))
            .collect())
    }

    fn taxonomies(&self, post_type: PostType) -> Result<Vec<String>, StoreError> {
        if self.taxonomies.is_empty() {
            return Ok(default_taxonomies(post_type));
        }
        Ok(self
            .taxonomies
            .iter()
            .filter(|tax| tax.object_types.contains(&post_type))
            .map(|tax| tax.name.clone())
            .collect())
    }

    fn terms(&self, id: PostId, taxonomy: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .find(id)?
            .terms
            .get(taxonomy)
            .cloned()
            .unwrap_or_default())
    }

    fn attachments(&self, id: PostId) -> Result<Vec<Attachment>, StoreError> {
        Ok(self
            .attachments
            .iter()
            .filter(|attachment| attachment.parent_id == id)
            .cloned()
            .collect())
    }

    fn comments(&self, id: PostId) -> Result<Vec<Comment>, StoreError> {
        Ok(self
            .comments
            .iter()
            .filter(|comment| comment.post_id == id)
            .cloned()
            .collect())
    }

    fn options(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .options
            .iter()
            .map(|option| (option.name.clone(), option.value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PostStatus, PostType};

    const SNAPSHOT: &str = r#"{
        "home_url": "https://example.com/",
        "authors": { "1": "Ada" },
        "options": [ { "name": "blogname", "value": "Example" } ],
        "posts": [
            {
                "id": 10, "type": "post", "status": "publish",
                "title": "Hello", "slug": "hello", "author_id": 1,
                "date": "2020-01-02T10:00:00+01:00",
                "permalink": "https://example.com/2020/01/hello/",
                "custom_fields": [ { "key": "foo", "values": ["bar"] } ],
                "terms": { "category": ["News"] }
            },
            {
                "id": 11, "type": "revision", "status": "inherit",
                "title": "rev", "slug": "rev", "author_id": 1,
                "date": "2020-01-02T10:00:00+01:00",
                "permalink": "https://example.com/?p=11"
            },
            {
                "id": 12, "type": "page", "status": "trash",
                "title": "gone", "slug": "gone", "author_id": 1,
                "date": "2020-01-02T10:00:00+01:00",
                "permalink": "https://example.com/gone/"
            }
        ]
    }"#;

    #[test]
    fn json_snapshot_loads_and_filters_posts() {
        let snapshot = SiteSnapshot::from_json(SNAPSHOT).unwrap();
        assert_eq!(snapshot.post_ids().unwrap(), vec![10]);

        let post = snapshot.post(10).unwrap();
        assert_eq!(post.post_type, PostType::Post);
        assert_eq!(post.status, PostStatus::Publish);
        assert_eq!(snapshot.post(11).unwrap().post_type, PostType::Other);
        assert_eq!(snapshot.post(12).unwrap().status, PostStatus::Other);

        assert_eq!(snapshot.home_url(), "https://example.com");
        assert_eq!(snapshot.site_url(), "https://example.com");
        assert_eq!(snapshot.author_display_name(1).unwrap(), "Ada");
        assert_eq!(snapshot.terms(10, "category").unwrap(), vec!["News"]);
        assert!(snapshot.terms(10, "post_tag").unwrap().is_empty());
        assert_eq!(
            snapshot.taxonomies(PostType::Post).unwrap(),
            vec!["category", "post_tag", "post_format"]
        );
        assert_eq!(
            snapshot.custom_fields(10).unwrap(),
            vec![("foo".to_string(), vec!["bar".to_string()])]
        );
    }

    #[test]
    fn missing_post_is_an_error() {
        let snapshot = SiteSnapshot::default();
        assert_eq!(snapshot.post(99), Err(StoreError::PostNotFound(99)));
    }
}
