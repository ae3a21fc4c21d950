use std::collections::BTreeMap;
use std::path::Path;

use hugo_export_core::{ContentStore, Post, StoreError};
use serde_yaml::{Mapping, Value};

use crate::persist::{FileStore, PersistError};
use crate::resolver::RewriteLedger;

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to copy attachment {filename}: {source}")]
    Persist {
        filename: String,
        #[source]
        source: PersistError,
    },
}

/// Files copied from a post's attachments.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttachmentImport {
    /// `filename -> source URL`.
    pub files: BTreeMap<String, String>,
    /// Filename of the featured image, when it was copied.
    pub thumbnail: Option<String>,
    /// Page bundle resource entries, in store order.
    pub resources: Vec<Value>,
}

impl AttachmentImport {
    /// Seed a post's rewrite ledger with the attachment URLs.
    pub fn rewrite_ledger(&self) -> RewriteLedger {
        let mut ledger = RewriteLedger::new();
        for (filename, url) in &self.files {
            ledger.insert(url.clone(), filename.clone());
        }
        ledger
    }
}

/// Copy every attachment of `post` into `destination`. Missing source files
/// are logged and skipped; colliding names overwrite, last one wins.
pub fn import_attachments(
    store: &dyn ContentStore,
    files: &dyn FileStore,
    post: &Post,
    destination: &Path,
) -> Result<AttachmentImport, AttachmentError> {
    let mut import = AttachmentImport::default();

    for attachment in store.attachments(post.id)? {
        if !files.exists(&attachment.file) {
            export_logging::export_warn!(
                "post {}: attachment {} missing at {}",
                post.id,
                attachment.id,
                attachment.file.display()
            );
            continue;
        }

        let filename = attachment.bundle_filename();
        files
            .copy(&attachment.file, &destination.join(&filename))
            .map_err(|source| AttachmentError::Persist {
                filename: filename.clone(),
                source,
            })?;

        let is_thumbnail = post.thumbnail_id == Some(attachment.id);
        if is_thumbnail {
            import.thumbnail = Some(filename.clone());
        }

        let mut resource = Mapping::new();
        resource.insert("src".into(), filename.clone().into());
        let name = if is_thumbnail { "thumbnail".to_string() } else { filename.clone() };
        resource.insert("name".into(), name.into());
        if !attachment.title.is_empty() {
            resource.insert("title".into(), attachment.title.clone().into());
        }
        import.resources.push(Value::Mapping(resource));
        import.files.insert(filename, attachment.url);
    }

    Ok(import)
}
