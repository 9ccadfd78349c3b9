//! Completion marker written after a successful bootstrap.
//!
//! Records the manifest digest so `status` can tell whether the manifest
//! changed since the environment was last populated.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::layout::EnvLayout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMarker {
    /// SHA-256 of the manifest at install time; `None` if it was unreadable.
    pub manifest_sha256: Option<String>,
    pub completed_at: String,
}

impl CompletionMarker {
    pub fn new(manifest_sha256: Option<String>) -> Self {
        Self {
            manifest_sha256,
            completed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Hex SHA-256 of the manifest contents, `None` when the file does not exist.
pub fn manifest_digest(manifest: &Path) -> Result<Option<String>> {
    if !manifest.exists() {
        return Ok(None);
    }
    let bytes = fs::read(manifest)
        .with_context(|| format!("Failed to read manifest: {}", manifest.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(Some(hex::encode(hasher.finalize())))
}

pub fn write(layout: &EnvLayout, marker: &CompletionMarker) -> Result<()> {
    let path = layout.marker();
    let body = serde_json::to_string_pretty(marker).context("Serialize completion marker")?;
    fs::write(&path, body)
        .with_context(|| format!("Failed to write marker: {}", path.display()))?;
    Ok(())
}

/// Read the marker. Missing file is `Ok(None)`; an unparsable one is treated
/// the same so a stale or hand-edited marker never blocks a rebuild.
pub fn read(layout: &EnvLayout) -> Result<Option<CompletionMarker>> {
    let path = layout.marker();
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read marker: {}", path.display()))?;
    match serde_json::from_str(&content) {
        Ok(m) => Ok(Some(m)),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Ignoring unreadable completion marker"
            );
            Ok(None)
        }
    }
}
