use crate::model::{Attachment, AuthorId, Comment, Post, PostId, PostType};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("post {0} not found")]
    PostNotFound(PostId),
    #[error("author {0} not found")]
    AuthorNotFound(AuthorId),
    #[error("content store error: {0}")]
    Backend(String),
}

/// Read-only access to the site's content.
pub trait ContentStore: Send + Sync {
    /// Ids of every post and page with status publish, draft or private.
    fn post_ids(&self) -> Result<Vec<PostId>, StoreError>;

    fn post(&self, id: PostId) -> Result<Post, StoreError>;

    fn author_display_name(&self, id: AuthorId) -> Result<String, StoreError>;

    /// Home URL without trailing slash, e.g. `https://example.com`.
    fn home_url(&self) -> &str;

    /// Site URL without trailing slash; differs from the home URL when
    /// WordPress lives in a subdirectory.
    fn site_url(&self) -> &str;

    /// All custom fields in store order, hidden (`_`-prefixed) ones included.
    fn custom_fields(&self, id: PostId) -> Result<Vec<(String, Vec<String>)>, StoreError>;

    /// Taxonomy names registered for a post type.
    fn taxonomies(&self, post_type: PostType) -> Result<Vec<String>, StoreError>;

    /// Term names assigned to a post, in store order.
    fn terms(&self, id: PostId, taxonomy: &str) -> Result<Vec<String>, StoreError>;

    fn attachments(&self, id: PostId) -> Result<Vec<Attachment>, StoreError>;

    /// Every comment of a post regardless of type or approval.
    fn comments(&self, id: PostId) -> Result<Vec<Comment>, StoreError>;

    /// Site-wide options in store order.
    fn options(&self) -> Result<Vec<(String, String)>, StoreError>;
}

/// Turns a post's raw content into the HTML a visitor would see.
pub trait ContentRenderer: Send + Sync {
    fn render(&self, post: &Post) -> String;
}
