//! Named policy profiles.
//!
//! Both profiles run the same pipeline; they only differ in how many aliases
//! are generated, which linked files count as media, where the asset ledgers
//! end up, and which optional keys are written.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AliasMode {
    /// Current permalink, its parent path, and every legacy slug in raw,
    /// entity-decoded and transliterated forms.
    Broad,
    /// Current permalink and its transliterated variant.
    Minimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LedgerPlacement {
    /// `imported_media: {imported, recovered, lost}` in the post front matter.
    FrontMatter,
    /// A `media.yaml` file next to the post's `index.md`.
    Sidecar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileName {
    Broad,
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportProfile {
    pub alias_mode: AliasMode,
    /// Lowercase extensions of linked files worth importing.
    pub media_extensions: Vec<String>,
    pub ledger_placement: LedgerPlacement,
    /// Emit the page bundle `resources` list.
    pub emit_resources: bool,
    /// Emit `guid` inside the `wordpress` provenance block.
    pub emit_guid: bool,
}

const BROAD_EXTENSIONS: &[&str] = &[
    "gif", "jpeg", "jpg", "png", "svg", "m4a", "mp3", "oga", "m4v", "mov", "mp4", "mpeg", "mpg",
    "swf", "wmv", "pdf", "ppt", "xls", "zip",
];

const MINIMAL_EXTENSIONS: &[&str] = &["gif", "jpeg", "jpg", "png", "svg", "webp"];

impl ExportProfile {
    pub fn named(name: ProfileName) -> Self {
        match name {
            ProfileName::Broad => Self::broad(),
            ProfileName::Minimal => Self::minimal(),
        }
    }

    pub fn broad() -> Self {
        Self {
            alias_mode: AliasMode::Broad,
            media_extensions: to_owned_list(BROAD_EXTENSIONS),
            ledger_placement: LedgerPlacement::FrontMatter,
            emit_resources: true,
            emit_guid: true,
        }
    }

    pub fn minimal() -> Self {
        Self {
            alias_mode: AliasMode::Minimal,
            media_extensions: to_owned_list(MINIMAL_EXTENSIONS),
            ledger_placement: LedgerPlacement::Sidecar,
            emit_resources: false,
            emit_guid: false,
        }
    }

    pub fn is_media_extension(&self, extension: &str) -> bool {
        self.media_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    }
}

impl Default for ExportProfile {
    fn default() -> Self {
        Self::broad()
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
