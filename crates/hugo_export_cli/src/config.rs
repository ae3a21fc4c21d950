use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hugo_export_core::{ExportProfile, OptionsPolicy, ProfileName};
use hugo_export_engine::{ArchiveLookup, ExportSettings, FetchSettings, DEFAULT_AVAILABILITY_ENDPOINT};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RendererKind {
    /// Wrap blank-line separated blocks in paragraphs.
    #[default]
    Paragraph,
    /// Content is already HTML.
    Passthrough,
}

/// Everything an export run can be configured with. Every field is optional
/// in the RON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub profile: ProfileName,
    pub posts_folder: String,
    /// Directory site-local media URLs are resolved against.
    pub content_root: PathBuf,
    /// Where the run directory is created.
    pub output_dir: PathBuf,
    pub include_comments: bool,
    pub zip: bool,
    pub renderer: RendererKind,
    pub archive_endpoint: String,
    pub options: OptionsPolicy,
    pub fetch: FetchConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            profile: ProfileName::Broad,
            posts_folder: "post".to_string(),
            content_root: PathBuf::from("."),
            output_dir: std::env::temp_dir(),
            include_comments: true,
            zip: false,
            renderer: RendererKind::default(),
            archive_endpoint: DEFAULT_AVAILABILITY_ENDPOINT.to_string(),
            options: OptionsPolicy::default(),
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Media types a fetched file may have; empty accepts anything.
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
            redirect_limit: defaults.redirect_limit,
            max_bytes: defaults.max_bytes,
            allowed_content_types: defaults.allowed_content_types,
        }
    }
}

impl FetchConfig {
    pub fn to_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            allowed_content_types: self.allowed_content_types.clone(),
        }
    }
}

impl ExportConfig {
    pub fn to_settings(&self) -> ExportSettings {
        ExportSettings {
            profile: ExportProfile::named(self.profile),
            posts_folder: self.posts_folder.clone(),
            content_root: self.content_root.clone(),
            include_comments: self.include_comments,
            options_policy: self.options.clone(),
            archive: ArchiveLookup::new(self.archive_endpoint.clone()),
            work_dir: self.output_dir.clone(),
        }
    }
}

/// Read a RON config file; no path means all defaults.
pub fn load_config(path: Option<&Path>) -> Result<ExportConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(ExportConfig::default());
    };
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    export_logging::export_info!("Loaded config from {:?}", path);
    Ok(config)
}
