//! Package manifest parsing.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::repository::RepositoryHandle;

/// Conventional manifest file name at the repository root.
pub const DEFAULT_MANIFEST: &str = "composer.json";

/// Manifest fields consumed by the update cycle.
///
/// Link maps are keyed by package name and hold the version constraint
/// verbatim. Unknown manifest fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ManifestInfo {
    pub name: Option<String>,
    pub readme: Option<String>,
    pub require: BTreeMap<String, String>,
    #[serde(rename = "require-dev")]
    pub require_dev: BTreeMap<String, String>,
    pub conflict: BTreeMap<String, String>,
    pub provide: BTreeMap<String, String>,
    pub replace: BTreeMap<String, String>,
}

impl ManifestInfo {
    /// Parses a JSON manifest document.
    ///
    /// # Errors
    ///
    /// Returns error if the document is not valid JSON or a field has the
    /// wrong shape.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("Failed to parse manifest JSON")
    }

    /// Readme hint, if present and not blank.
    pub fn readme_hint(&self) -> Option<&str> {
        self.readme
            .as_deref()
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
    }
}

/// Loads the manifest from the repository's root identifier.
///
/// A missing manifest file yields an empty manifest.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a valid manifest.
pub fn load_manifest(repo: &dyn RepositoryHandle, file: &str) -> Result<ManifestInfo> {
    let reference = repo.root_identifier();
    let Some(bytes) = repo
        .file_content(file, reference)
        .with_context(|| format!("Failed to read {} at {}", file, reference))?
    else {
        debug!(file, reference, "manifest not found, using empty manifest");
        return Ok(ManifestInfo::default());
    };

    ManifestInfo::from_slice(&bytes).with_context(|| format!("Invalid manifest {}", file))
}
