use crate::front_matter::FrontMatter;
use crate::metadata::string_list;
use crate::model::Post;
use crate::store::{ContentStore, StoreError};

const POST_FORMAT: &str = "post_format";
const FORMAT_PREFIX: &str = "post-format-";

/// Hugo's name for a WordPress taxonomy.
pub fn hugo_taxonomy_key(taxonomy: &str) -> &str {
    match taxonomy {
        "post_tag" => "tags",
        "category" => "categories",
        POST_FORMAT => "format",
        other => other,
    }
}

/// Term lists keyed by Hugo taxonomy name; the post format becomes a scalar.
pub fn convert_terms(store: &dyn ContentStore, post: &Post) -> Result<FrontMatter, StoreError> {
    let mut terms = FrontMatter::new();
    for taxonomy in store.taxonomies(post.post_type)? {
        let names = store.terms(post.id, &taxonomy)?;
        let key = hugo_taxonomy_key(&taxonomy).to_string();
        if taxonomy == POST_FORMAT {
            if let Some(format) = names.first() {
                let format = format.strip_prefix(FORMAT_PREFIX).unwrap_or(format);
                terms.insert(key, format.to_ascii_lowercase());
            }
        } else {
            terms.insert(key, string_list(names));
        }
    }
    Ok(terms)
}
