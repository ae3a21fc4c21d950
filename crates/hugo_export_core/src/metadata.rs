use serde_yaml::{Mapping, Value};

use crate::front_matter::FrontMatter;
use crate::model::{Post, PostStatus};
use crate::profile::{AliasMode, ExportProfile};
use crate::store::{ContentStore, StoreError};
use crate::text::{decode_entities, decode_slug, dirname, join_path, url_decode};
use crate::transliterate::transliterate;

/// Custom fields left behind by plugins that never belong in front matter.
pub const DENYLISTED_FIELDS: &[&str] = &[
    "mct_proposed_tags",
    "go_oc_settings",
    "bgeo",
    "go-opencalais",
    "yourls_shorturl",
];

const OLD_SLUG_FIELD: &str = "_wp_old_slug";

/// Filesystem-safe slug: url-decoded, entity-decoded, transliterated.
pub fn post_slug(post: &Post) -> String {
    transliterate(&decode_slug(&post.slug))
}

/// Assemble the per-post front matter, up to and including custom fields.
///
/// Taxonomy terms and asset ledgers are merged by the caller; nothing is
/// pruned here.
pub fn build_metadata(
    store: &dyn ContentStore,
    post: &Post,
    profile: &ExportProfile,
) -> Result<FrontMatter, StoreError> {
    let slug = post_slug(post);
    let custom_fields = store.custom_fields(post.id)?;
    let mut meta = FrontMatter::new();

    meta.insert("title", decode_entities(&post.title).into_owned());
    meta.insert("slug", slug.clone());
    meta.insert("author", author_name(store, post)?);
    meta.insert("type", post.post_type.as_str());
    meta.insert("date", post.iso_date());

    let excerpt = decode_entities(&post.excerpt);
    if !excerpt.trim().is_empty() {
        meta.insert("excerpt", excerpt.into_owned());
    }

    if matches!(post.status, PostStatus::Draft | PostStatus::Private) {
        // Private posts are drafts too so they never get published by accident.
        meta.insert("draft", true);
    }
    if post.status == PostStatus::Private {
        meta.insert("private", true);
    }

    let old_slugs = custom_fields
        .iter()
        .filter(|(key, _)| key == OLD_SLUG_FIELD)
        .flat_map(|(_, values)| values.iter().map(String::as_str));
    let aliases = build_aliases(store.home_url(), post, &slug, old_slugs, profile.alias_mode);
    meta.insert("aliases", string_list(aliases));

    meta.insert("wordpress", provenance(post, profile));

    if let Some(featured) = featured_image(store, post)? {
        meta.insert("featured_image", featured);
    }

    for (key, values) in custom_fields {
        if key.starts_with('_') || DENYLISTED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        if is_empty_field(&values) {
            continue;
        }
        meta.insert(key, field_value(values));
    }

    Ok(meta)
}

fn author_name(store: &dyn ContentStore, post: &Post) -> Result<String, StoreError> {
    match store.author_display_name(post.author_id) {
        Ok(name) => Ok(name),
        Err(StoreError::AuthorNotFound(id)) => {
            export_logging::export_warn!("post {} references unknown author {}", post.id, id);
            Ok(String::new())
        }
        Err(err) => Err(err),
    }
}

/// Permalink relative to the home URL, url- and entity-decoded.
pub fn relative_permalink(home_url: &str, post: &Post) -> String {
    let relative = if home_url.is_empty() {
        post.permalink.clone()
    } else {
        post.permalink.replace(home_url, "")
    };
    decode_slug(&relative)
}

/// Sorted, deduplicated redirect paths for a post.
pub fn build_aliases<'a>(
    home_url: &str,
    post: &Post,
    slug: &str,
    old_slugs: impl IntoIterator<Item = &'a str>,
    mode: AliasMode,
) -> Vec<String> {
    let wp_url = relative_permalink(home_url, post);
    let mut aliases = Vec::new();

    if mode == AliasMode::Broad {
        let base = dirname(&wp_url);
        for old in old_slugs.into_iter().filter(|s| !s.is_empty()) {
            let raw = url_decode(old);
            let decoded = decode_entities(&raw).into_owned();
            aliases.push(join_path(base, &raw));
            aliases.push(join_path(base, &transliterate(&decoded)));
            aliases.push(join_path(base, &decoded));
        }
        if base != "/" {
            aliases.push(base.to_string());
        }
    }

    aliases.push(wp_url.clone());
    let wp_slug = decode_slug(&post.slug);
    if !wp_slug.is_empty() && wp_slug != slug {
        aliases.push(wp_url.replace(&wp_slug, slug));
    }

    aliases.retain(|alias| !alias.is_empty());
    aliases.sort();
    aliases.dedup();
    aliases
}

fn provenance(post: &Post, profile: &ExportProfile) -> Value {
    let mut block = Mapping::new();
    block.insert("id".into(), post.id.into());
    block.insert("slug".into(), decode_slug(&post.slug).into());
    if profile.emit_guid {
        block.insert("guid".into(), decode_slug(&post.guid).into());
    }
    block.insert("url".into(), decode_slug(&post.permalink).into());
    Value::Mapping(block)
}

fn featured_image(store: &dyn ContentStore, post: &Post) -> Result<Option<String>, StoreError> {
    let Some(thumbnail_id) = post.thumbnail_id else {
        return Ok(None);
    };
    Ok(store
        .attachments(post.id)?
        .into_iter()
        .find(|attachment| attachment.id == thumbnail_id)
        .map(|attachment| attachment.bundle_filename()))
}

/// No values, or a single value that is `""` or `"0"`. Two or more values are
/// never empty, whatever they hold.
pub fn is_empty_field(values: &[String]) -> bool {
    match values {
        [] => true,
        [only] => only.is_empty() || only == "0",
        _ => false,
    }
}

fn field_value(mut values: Vec<String>) -> Value {
    if values.len() == 1 {
        Value::String(values.remove(0))
    } else {
        string_list(values)
    }
}

pub(crate) fn string_list(items: Vec<String>) -> Value {
    Value::Sequence(items.into_iter().map(Value::String).collect())
}
