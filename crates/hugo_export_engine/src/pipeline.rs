//! One export run: options, then every post in turn.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hugo_export_core::{
    build_metadata, convert_options, convert_terms, AssetOutcome, ContentRenderer, ContentStore,
    Document, ExportProfile, LedgerPlacement, OptionsPolicy, PostId, ResolvedAsset, StoreError,
};
use serde_yaml::{Mapping, Value};

use crate::archive::ArchiveLookup;
use crate::assembler::{destination_dir, rewrite_media, write_post, AssembleError, PostBundle};
use crate::attachments::{import_attachments, AttachmentError};
use crate::comments::{build_comments_document, COMMENTS_FILENAME};
use crate::convert::{convert_content, ContentFormat, Converter, Html2MdConverter};
use crate::fetch::Fetcher;
use crate::filename::run_directory_name;
use crate::persist::{FileStore, PersistError};
use crate::resolver::{AssetResolver, ResolveError};

pub const CONFIG_FILENAME: &str = "config.yaml";
pub const STATIC_DIR: &str = "static";

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub profile: ExportProfile,
    /// Folder under the run root that holds post bundles.
    pub posts_folder: String,
    /// Directory site-local media URLs are resolved against.
    pub content_root: PathBuf,
    pub include_comments: bool,
    pub options_policy: OptionsPolicy,
    pub archive: ArchiveLookup,
    /// Parent directory of the per-run directory.
    pub work_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            profile: ExportProfile::default(),
            posts_folder: "post".to_string(),
            content_root: PathBuf::from("."),
            include_comments: true,
            options_policy: OptionsPolicy::default(),
            archive: ArchiveLookup::default(),
            work_dir: std::env::temp_dir(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to create {}: {source}", path.display())]
    RunRoot {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
    #[error("failed to serialize {}: {source}", path.display())]
    ConfigYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
}

/// Errors that abandon a single post; the run carries on.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to create {}: {source}", path.display())]
    BundleDir {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
    #[error(transparent)]
    Attachments(#[from] AttachmentError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPost {
    pub id: PostId,
    pub error: String,
}

/// What one run produced. Lives only as long as the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRun {
    pub root: PathBuf,
    /// Every `index.md` written.
    pub documents: Vec<PathBuf>,
    pub assets: Vec<ResolvedAsset>,
    /// Posts whose body was kept as HTML.
    pub html_fallbacks: Vec<PostId>,
    pub failed: Vec<FailedPost>,
}

impl ExportRun {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    pub fn imported(&self) -> impl Iterator<Item = &ResolvedAsset> {
        self.assets.iter().filter(|asset| {
            matches!(
                asset.outcome,
                AssetOutcome::LocalCopied | AssetOutcome::RemoteFetched
            )
        })
    }

    pub fn recovered(&self) -> impl Iterator<Item = &ResolvedAsset> {
        self.with_outcome(AssetOutcome::ArchiveRecovered)
    }

    pub fn lost(&self) -> impl Iterator<Item = &ResolvedAsset> {
        self.with_outcome(AssetOutcome::Lost)
    }

    /// `{root}.zip`, next to the run directory.
    pub fn archive_path(&self) -> PathBuf {
        let mut name = OsString::from(self.root.as_os_str());
        name.push(".zip");
        PathBuf::from(name)
    }

    fn with_outcome(&self, outcome: AssetOutcome) -> impl Iterator<Item = &ResolvedAsset> {
        self.assets
            .iter()
            .filter(move |asset| asset.outcome == outcome)
    }
}

struct PostReport {
    index: PathBuf,
    assets: Vec<ResolvedAsset>,
    format: ContentFormat,
}

pub struct Exporter<'a> {
    store: &'a dyn ContentStore,
    renderer: &'a dyn ContentRenderer,
    files: &'a dyn FileStore,
    fetcher: &'a dyn Fetcher,
    converter: &'a dyn Converter,
    settings: ExportSettings,
}

impl<'a> Exporter<'a> {
    pub fn new(
        store: &'a dyn ContentStore,
        renderer: &'a dyn ContentRenderer,
        files: &'a dyn FileStore,
        fetcher: &'a dyn Fetcher,
        settings: ExportSettings,
    ) -> Self {
        Self {
            store,
            renderer,
            files,
            fetcher,
            converter: &Html2MdConverter,
            settings,
        }
    }

    pub fn with_converter(mut self, converter: &'a dyn Converter) -> Self {
        self.converter = converter;
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Export every post into a fresh run directory under the work dir.
    pub async fn run(&self, started: DateTime<Utc>) -> Result<ExportRun, ExportError> {
        let root = self
            .settings
            .work_dir
            .join(run_directory_name(self.store.site_url(), started));
        for dir in [
            root.clone(),
            root.join(&self.settings.posts_folder),
            root.join(STATIC_DIR),
        ] {
            self.files
                .create_dir_all(&dir)
                .map_err(|source| ExportError::RunRoot { path: dir, source })?;
        }

        export_options(self.store, self.files, &self.settings.options_policy, &root)?;

        let ids = self.store.post_ids()?;
        export_logging::export_info!("exporting {} posts into {}", ids.len(), root.display());

        let mut run = ExportRun::new(root.clone());
        for id in ids {
            match self.export_post(id, &root).await {
                Ok(report) => {
                    if report.format == ContentFormat::Html {
                        run.html_fallbacks.push(id);
                    }
                    run.documents.push(report.index);
                    run.assets.extend(report.assets);
                }
                Err(err) => {
                    export_logging::export_error!("post {id} failed: {err}");
                    run.failed.push(FailedPost {
                        id,
                        error: err.to_string(),
                    });
                }
            }
        }

        export_logging::export_info!(
            "export finished: {} documents, {} imported, {} recovered, {} lost, {} failed",
            run.documents.len(),
            run.imported().count(),
            run.recovered().count(),
            run.lost().count(),
            run.failed.len()
        );
        Ok(run)
    }

    async fn export_post(&self, id: PostId, root: &Path) -> Result<PostReport, PostError> {
        let profile = &self.settings.profile;
        let post = self.store.post(id)?;
        let dir = destination_dir(root, &self.settings.posts_folder, &post);
        self.files
            .create_dir_all(&dir)
            .map_err(|source| PostError::BundleDir {
                path: dir.clone(),
                source,
            })?;
        export_logging::export_debug!("post {id} -> {}", dir.display());

        let mut meta = build_metadata(self.store, &post, profile)?;
        meta.merge(convert_terms(self.store, &post)?);

        let attachments = import_attachments(self.store, self.files, &post, &dir)?;
        let mut ledger = attachments.rewrite_ledger();

        let rendered = self.renderer.render(&post);
        let resolver = AssetResolver {
            fetcher: self.fetcher,
            files: self.files,
            archive: &self.settings.archive,
            profile,
            site_url: self.store.site_url(),
            content_root: &self.settings.content_root,
        };
        let resolution = resolver.resolve(&post, &rendered, &dir, &mut ledger).await?;

        let mut media_ledger = resolution.to_front_matter();
        if !attachments.files.is_empty() {
            let files: Mapping = attachments
                .files
                .iter()
                .map(|(filename, url)| (Value::from(filename.as_str()), Value::from(url.as_str())))
                .collect();
            media_ledger.insert("attachments", Value::Mapping(files));
        }
        let media_ledger = match profile.ledger_placement {
            LedgerPlacement::FrontMatter => {
                meta.insert("imported_media", media_ledger.into_value());
                None
            }
            LedgerPlacement::Sidecar => Some(media_ledger),
        };

        let converted = convert_content(self.converter, &rewrite_media(&rendered, &ledger));
        if converted.format == ContentFormat::Html {
            export_logging::export_warn!("post {id}: body kept as html");
        }

        let comments = if self.settings.include_comments {
            build_comments_document(self.store, self.converter, &post)?
        } else {
            None
        };

        meta.prune();
        if profile.emit_resources {
            let mut resources = attachments.resources.clone();
            resources.extend(
                resolution
                    .stored_filenames()
                    .into_iter()
                    .filter(|filename| !attachments.files.contains_key(*filename))
                    .map(source_entry),
            );
            if comments.is_some() {
                resources.push(source_entry(COMMENTS_FILENAME));
            }
            if !resources.is_empty() {
                meta.insert("resources", Value::Sequence(resources));
            }
        }

        let bundle = PostBundle {
            dir,
            index: Document::new(meta, converted.body),
            comments,
            media_ledger,
        };
        let index = write_post(self.files, &bundle)?;

        Ok(PostReport {
            index,
            assets: resolution.assets,
            format: converted.format,
        })
    }
}

fn source_entry(filename: &str) -> Value {
    let mut entry = Mapping::new();
    entry.insert("src".into(), filename.into());
    Value::Mapping(entry)
}

/// Write the whitelisted site options to `{root}/config.yaml`.
pub fn export_options(
    store: &dyn ContentStore,
    files: &dyn FileStore,
    policy: &OptionsPolicy,
    root: &Path,
) -> Result<PathBuf, ExportError> {
    let path = root.join(CONFIG_FILENAME);
    let config = convert_options(&store.options()?, policy);
    let yaml = config.to_yaml().map_err(|source| ExportError::ConfigYaml {
        path: path.clone(),
        source,
    })?;
    files
        .write(&path, yaml.as_bytes())
        .map_err(|source| ExportError::ConfigWrite {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
