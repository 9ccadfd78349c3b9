//! Activation as a value.
//!
//! Sourcing `activate` would change the shell's `PATH` and `VIRTUAL_ENV`. Here
//! the same overrides are computed once and attached to each child process,
//! so the bootstrapper's own environment is never modified.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::BootstrapError;
use crate::layout::EnvLayout;

/// An environment ready to run commands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedEnv {
    root: PathBuf,
    python: PathBuf,
    scripts_dir: PathBuf,
    vars: Vec<(OsString, OsString)>,
    removed: Vec<OsString>,
}

impl ActivatedEnv {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Variables set on every child process.
    pub fn vars(&self) -> &[(OsString, OsString)] {
        &self.vars
    }

    /// Variables cleared on every child process.
    pub fn removed_vars(&self) -> &[OsString] {
        &self.removed
    }

    /// Prefer an executable from the environment's scripts dir, falling back
    /// to the bare name (resolved by the OS against the activated PATH).
    pub fn resolve_program(&self, name: &str) -> PathBuf {
        let direct = self.scripts_dir.join(name);
        if direct.is_file() {
            return direct;
        }
        if cfg!(target_os = "windows") {
            let exe = self.scripts_dir.join(format!("{}.exe", name));
            if exe.is_file() {
                return exe;
            }
        }
        PathBuf::from(name)
    }
}

/// Activate the environment at `layout`, prepending its scripts dir to the
/// current process's `PATH`.
pub fn activate(layout: &EnvLayout) -> Result<ActivatedEnv, BootstrapError> {
    activate_with_path(layout, std::env::var_os("PATH"))
}

/// Activate against an explicit base `PATH`.
pub fn activate_with_path(
    layout: &EnvLayout,
    base_path: Option<OsString>,
) -> Result<ActivatedEnv, BootstrapError> {
    if !layout.root().is_dir() {
        return Err(BootstrapError::Activation {
            reason: format!(
                "environment directory {} does not exist",
                layout.root().display()
            ),
        });
    }
    let entry = layout.activate_script();
    if !entry.is_file() {
        return Err(BootstrapError::Activation {
            reason: format!("activation entry point {} is missing", entry.display()),
        });
    }
    let python = layout.python();
    if !python.exists() {
        return Err(BootstrapError::Activation {
            reason: format!("interpreter {} is missing", python.display()),
        });
    }

    let scripts_dir = layout.scripts_dir();
    let mut entries = vec![scripts_dir.clone()];
    if let Some(ref p) = base_path {
        entries.extend(std::env::split_paths(p));
    }
    let path = std::env::join_paths(entries).map_err(|e| BootstrapError::Activation {
        reason: format!("cannot build PATH with {}: {}", scripts_dir.display(), e),
    })?;

    let vars = vec![
        (
            OsString::from("VIRTUAL_ENV"),
            layout.root().as_os_str().to_os_string(),
        ),
        (OsString::from("PATH"), path),
    ];

    Ok(ActivatedEnv {
        root: layout.root().to_path_buf(),
        python,
        scripts_dir,
        vars,
        removed: vec![OsString::from("PYTHONHOME")],
    })
}
