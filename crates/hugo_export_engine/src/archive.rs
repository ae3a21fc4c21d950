//! Web-archive recovery for media that can no longer be fetched.

use serde::Deserialize;
use url::Url;

use crate::fetch::Fetcher;
use crate::{FailureKind, FetchError, FetchOutput};

pub const DEFAULT_AVAILABILITY_ENDPOINT: &str = "https://archive.org/wayback/available";

#[derive(Debug, Deserialize)]
struct Availability {
    #[serde(default)]
    archived_snapshots: ArchivedSnapshots,
}

#[derive(Debug, Default, Deserialize)]
struct ArchivedSnapshots {
    closest: Option<ClosestSnapshot>,
}

#[derive(Debug, Deserialize)]
struct ClosestSnapshot {
    url: Option<String>,
}

/// Client for the archive availability API.
#[derive(Debug, Clone)]
pub struct ArchiveLookup {
    endpoint: String,
}

impl Default for ArchiveLookup {
    fn default() -> Self {
        Self::new(DEFAULT_AVAILABILITY_ENDPOINT)
    }
}

impl ArchiveLookup {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Availability query for `url` near `timestamp` (`YYYYMMDDhhmmss`).
    pub fn query_url(&self, url: &str, timestamp: &str) -> Result<Url, FetchError> {
        Url::parse_with_params(&self.endpoint, &[("url", url), ("timestamp", timestamp)])
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// URL of the closest snapshot, if the archive knows one.
    pub async fn closest_snapshot(
        &self,
        fetcher: &dyn Fetcher,
        url: &str,
        timestamp: &str,
    ) -> Result<String, FetchError> {
        let query = self.query_url(url, timestamp)?;
        let output = fetcher.fetch(query.as_str()).await?;
        let availability: Availability = serde_json::from_slice(&output.bytes).map_err(|err| {
            FetchError::new(FailureKind::InvalidArchiveResponse, err.to_string())
        })?;
        availability
            .archived_snapshots
            .closest
            .and_then(|closest| closest.url)
            .filter(|snapshot| !snapshot.is_empty())
            .ok_or_else(|| FetchError::new(FailureKind::NotArchived, url))
    }

    /// Look up and download the raw archived bytes of `url`.
    pub async fn recover(
        &self,
        fetcher: &dyn Fetcher,
        url: &str,
        timestamp: &str,
    ) -> Result<FetchOutput, FetchError> {
        let snapshot = self.closest_snapshot(fetcher, url, timestamp).await?;
        let raw = raw_snapshot_url(&snapshot);
        export_logging::export_debug!("recovering {url} from {raw}");
        fetcher.fetch(&raw).await
    }
}

/// Snapshot URL that serves the original bytes instead of the archive's
/// framed replay page: `if_` goes in front of the first `/http`.
pub fn raw_snapshot_url(snapshot: &str) -> String {
    snapshot.replacen("/http", "if_/http", 1)
}
