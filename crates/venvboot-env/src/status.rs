//! Read-only inspection of an environment directory.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::marker::{self, CompletionMarker};
use crate::pipeline::BootstrapPlan;

#[derive(Debug, Clone, Serialize)]
pub struct EnvStatus {
    pub env_dir: PathBuf,
    pub exists: bool,
    pub valid: bool,
    pub python: Option<PathBuf>,
    pub manifest: PathBuf,
    pub manifest_sha256: Option<String>,
    pub marker: Option<CompletionMarker>,
}

impl EnvStatus {
    pub fn inspect(plan: &BootstrapPlan) -> Result<Self> {
        let layout = plan.layout();
        let valid = layout.is_valid();
        let marker = if valid { marker::read(&layout)? } else { None };
        Ok(Self {
            env_dir: layout.root().to_path_buf(),
            exists: layout.exists(),
            valid,
            python: valid.then(|| layout.python()),
            manifest: plan.manifest.clone(),
            manifest_sha256: marker::manifest_digest(&plan.manifest)?,
            marker,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.valid && self.marker.is_some()
    }

    /// Complete, and the manifest has not changed since the last install.
    pub fn is_up_to_date(&self) -> bool {
        match self.marker {
            Some(ref m) if self.valid => m.manifest_sha256 == self.manifest_sha256,
            _ => false,
        }
    }
}
