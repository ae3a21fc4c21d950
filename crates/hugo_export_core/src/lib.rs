//! Exporter core: content model, store capabilities and the pure
//! transformation steps (slugs, URLs, front matter, taxonomies, options).
mod front_matter;
mod metadata;
mod model;
mod options;
mod profile;
mod renderer;
mod snapshot;
mod store;
mod taxonomy;
pub mod text;
mod transliterate;
mod urls;

pub use front_matter::{is_falsy, Document, FrontMatter};
pub use metadata::{
    build_aliases, build_metadata, is_empty_field, post_slug, relative_permalink,
    DENYLISTED_FIELDS,
};
pub use model::{
    iso_utc, AssetOutcome, Attachment, AuthorId, Comment, CommentId, Post, PostId, PostStatus,
    PostType, ResolvedAsset,
};
pub use options::{convert_options, OptionsPolicy};
pub use profile::{AliasMode, ExportProfile, LedgerPlacement, ProfileName};
pub use renderer::{ParagraphRenderer, PassthroughRenderer};
pub use snapshot::{CustomField, SiteOption, SiteSnapshot, SnapshotPost, TaxonomyDef};
pub use store::{ContentRenderer, ContentStore, StoreError};
pub use taxonomy::{convert_terms, hugo_taxonomy_key};
pub use transliterate::{transliterate, TRANSLITERATION_TABLE};
pub use urls::find_urls;
