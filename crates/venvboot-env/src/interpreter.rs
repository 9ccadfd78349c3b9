//! Locate the base interpreter used to create environments.

use std::path::{Path, PathBuf};

use crate::error::BootstrapError;

/// Names tried on PATH when no interpreter is configured.
const CANDIDATES: &[&str] = &["python3", "python"];

/// Resolve the interpreter for `-m venv`.
///
/// A configured value containing a path separator is used as a path (spawning
/// it reports any problem), made absolute against the invoking directory so
/// `-C` does not change what it points at. A bare name is looked up on PATH.
pub fn resolve(configured: Option<&Path>) -> Result<PathBuf, BootstrapError> {
    match configured {
        Some(p) if p.is_absolute() => Ok(p.to_path_buf()),
        Some(p) if p.components().count() > 1 => {
            let cwd = std::env::current_dir().map_err(|e| {
                BootstrapError::EnvironmentCreation {
                    reason: format!("cannot resolve interpreter '{}': {}", p.display(), e),
                    exit_code: None,
                }
            })?;
            Ok(cwd.join(p))
        }
        Some(name) => which::which(name).map_err(|e| BootstrapError::EnvironmentCreation {
            reason: format!("interpreter '{}' not found in PATH: {}", name.display(), e),
            exit_code: None,
        }),
        None => find_on_path(),
    }
}

fn find_on_path() -> Result<PathBuf, BootstrapError> {
    for name in CANDIDATES {
        if let Ok(path) = which::which(name) {
            tracing::debug!(interpreter = %path.display(), "Found base interpreter");
            return Ok(path);
        }
    }
    Err(BootstrapError::EnvironmentCreation {
        reason: format!("none of {} found in PATH", CANDIDATES.join(", ")),
        exit_code: None,
    })
}
