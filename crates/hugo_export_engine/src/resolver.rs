//! Linked media resolution: local copy, remote fetch, archive recovery.

use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};

use hugo_export_core::text::{basename, decode_slug, extension, strip_scheme};
use hugo_export_core::{
    find_urls, transliterate, AssetOutcome, ExportProfile, FrontMatter, Post, ResolvedAsset,
};
use percent_encoding::percent_decode_str;
use serde_yaml::{Mapping, Value};
use url::Url;

use crate::archive::ArchiveLookup;
use crate::fetch::Fetcher;
use crate::types::FetchMetadata;
use crate::filename::{remote_asset_filename, safe_filename};
use crate::persist::{FileStore, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to store {filename}: {source}")]
    Persist {
        filename: String,
        #[source]
        source: PersistError,
    },
}

/// Original URL to bundle filename for every file placed next to a post.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewriteLedger {
    entries: BTreeMap<String, String>,
}

impl RewriteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, filename: impl Into<String>) {
        self.entries.insert(url.into(), filename.into());
    }

    pub fn filename_for(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    pub fn contains_filename(&self, filename: &str) -> bool {
        self.entries.values().any(|existing| existing == filename)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(url, filename)| (url.as_str(), filename.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of resolving every linked media URL of one post.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetResolution {
    pub assets: Vec<ResolvedAsset>,
}

impl AssetResolution {
    /// `filename -> url` for local copies and remote fetches.
    pub fn imported(&self) -> BTreeMap<String, String> {
        self.ledger(|outcome| {
            matches!(outcome, AssetOutcome::LocalCopied | AssetOutcome::RemoteFetched)
        })
    }

    pub fn recovered(&self) -> BTreeMap<String, String> {
        self.ledger(|outcome| outcome == AssetOutcome::ArchiveRecovered)
    }

    pub fn lost(&self) -> BTreeMap<String, String> {
        self.ledger(|outcome| outcome == AssetOutcome::Lost)
    }

    /// Filenames that now exist in the bundle, each once, in resolution order.
    pub fn stored_filenames(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.assets
            .iter()
            .filter(|asset| asset.outcome != AssetOutcome::Lost)
            .map(|asset| asset.filename.as_str())
            .filter(|filename| seen.insert(*filename))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// `{imported, recovered, lost}`, each present only when non-empty.
    pub fn to_front_matter(&self) -> FrontMatter {
        let mut ledgers = FrontMatter::new();
        for (key, ledger) in [
            ("imported", self.imported()),
            ("recovered", self.recovered()),
            ("lost", self.lost()),
        ] {
            if ledger.is_empty() {
                continue;
            }
            let mapping: Mapping = ledger
                .into_iter()
                .map(|(filename, url)| (Value::String(filename), Value::String(url)))
                .collect();
            ledgers.insert(key, Value::Mapping(mapping));
        }
        ledgers
    }

    fn ledger(&self, keep: impl Fn(AssetOutcome) -> bool) -> BTreeMap<String, String> {
        self.assets
            .iter()
            .filter(|asset| keep(asset.outcome))
            .map(|asset| (asset.filename.clone(), asset.url.clone()))
            .collect()
    }
}

/// Resolves the media a post links to into files inside its bundle.
pub struct AssetResolver<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub files: &'a dyn FileStore,
    pub archive: &'a ArchiveLookup,
    pub profile: &'a ExportProfile,
    /// Site URL; links under it are read from `content_root`.
    pub site_url: &'a str,
    pub content_root: &'a Path,
}

impl AssetResolver<'_> {
    /// Resolve every media URL in `rendered`. Files already recorded in
    /// `ledger` are skipped; new files are added to it.
    pub async fn resolve(
        &self,
        post: &Post,
        rendered: &str,
        destination: &Path,
        ledger: &mut RewriteLedger,
    ) -> Result<AssetResolution, ResolveError> {
        let timestamp = post.memento_timestamp();
        let mut resolution = AssetResolution::default();
        let mut seen = HashSet::new();

        for found in find_urls(rendered) {
            let url = found.replace("&amp;", "&");
            if !seen.insert(url.clone()) {
                continue;
            }
            let path = url_path(&url);
            let Some(ext) = extension(&path) else {
                continue;
            };
            if !self.profile.is_media_extension(&ext) {
                continue;
            }

            let raw_name = basename(&path);
            let name = transliterate(&decode_slug(raw_name));
            if ledger.contains_filename(&name)
                || ledger.contains_filename(&percent_decode_str(raw_name).decode_utf8_lossy())
            {
                export_logging::export_trace!("post {}: {url} already in bundle", post.id);
                continue;
            }

            let asset = self.resolve_one(&url, &name, destination, &timestamp).await?;
            export_logging::export_debug!(
                "post {}: {} -> {} ({})",
                post.id,
                asset.url,
                asset.filename,
                asset.outcome
            );
            if asset.outcome != AssetOutcome::Lost {
                ledger.insert(asset.url.clone(), asset.filename.clone());
            }
            resolution.assets.push(asset);
        }

        Ok(resolution)
    }

    async fn resolve_one(
        &self,
        url: &str,
        name: &str,
        destination: &Path,
        timestamp: &str,
    ) -> Result<ResolvedAsset, ResolveError> {
        if let Some(source) = self.local_source(url) {
            let filename = safe_filename(name);
            if self.files.exists(&source) {
                self.files
                    .copy(&source, &destination.join(&filename))
                    .map_err(|source| ResolveError::Persist {
                        filename: filename.clone(),
                        source,
                    })?;
                return Ok(resolved(url, AssetOutcome::LocalCopied, filename));
            }
            export_logging::export_warn!("local file {} missing for {url}", source.display());
            return self.recover(url, filename, destination, timestamp).await;
        }

        let host = Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .unwrap_or_default();
        let filename = remote_asset_filename(&host, name);
        match self.fetcher.fetch(url).await {
            Ok(output) => {
                log_fetched(&output.metadata);
                self.store(destination, &filename, &output.bytes)?;
                Ok(resolved(url, AssetOutcome::RemoteFetched, filename))
            }
            Err(err) => {
                export_logging::export_info!("fetching {url} failed: {err}");
                self.recover(url, filename, destination, timestamp).await
            }
        }
    }

    async fn recover(
        &self,
        url: &str,
        filename: String,
        destination: &Path,
        timestamp: &str,
    ) -> Result<ResolvedAsset, ResolveError> {
        match self.archive.recover(self.fetcher, url, timestamp).await {
            Ok(output) => {
                log_fetched(&output.metadata);
                self.store(destination, &filename, &output.bytes)?;
                Ok(resolved(url, AssetOutcome::ArchiveRecovered, filename))
            }
            Err(err) => {
                export_logging::export_warn!("lost {url}: {err}");
                Ok(resolved(url, AssetOutcome::Lost, filename))
            }
        }
    }

    fn store(&self, destination: &Path, filename: &str, bytes: &[u8]) -> Result<(), ResolveError> {
        self.files
            .write(&destination.join(filename), bytes)
            .map_err(|source| ResolveError::Persist {
                filename: filename.to_string(),
                source,
            })
    }

    /// File under the content root that a site-local URL points at.
    fn local_source(&self, url: &str) -> Option<PathBuf> {
        let site = strip_scheme(self.site_url).trim_end_matches('/');
        if site.is_empty() {
            return None;
        }
        let rest = strip_scheme(url).strip_prefix(site)?;
        if !(rest.is_empty() || rest.starts_with(['/', '?', '#'])) {
            return None;
        }
        let relative = rest.split(['?', '#']).next().unwrap_or(rest);
        let decoded = percent_decode_str(relative).decode_utf8_lossy();
        let relative = Path::new(decoded.trim_start_matches('/'));
        if relative
            .components()
            .any(|part| !matches!(part, Component::Normal(_) | Component::CurDir))
        {
            export_logging::export_warn!("{url} points outside the content root");
            return None;
        }
        Some(self.content_root.join(relative))
    }
}

fn log_fetched(metadata: &FetchMetadata) {
    export_logging::export_debug!(
        "fetched {} bytes of {} from {} after {} redirects",
        metadata.byte_len,
        metadata.content_type.as_deref().unwrap_or("unknown type"),
        metadata.final_url,
        metadata.redirect_count
    );
}

fn resolved(url: &str, outcome: AssetOutcome, filename: String) -> ResolvedAsset {
    ResolvedAsset {
        url: url.to_string(),
        outcome,
        filename,
    }
}

fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    }
}
