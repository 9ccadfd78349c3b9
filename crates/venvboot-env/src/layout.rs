//! Paths inside a virtual environment directory.

use std::path::{Path, PathBuf};

/// Marker file indicating a bootstrap ran to completion.
pub const ENV_MARKER_FILE: &str = ".venvboot_complete";

/// Config file every `python -m venv` environment has.
pub const PYVENV_CFG: &str = "pyvenv.cfg";

/// Platform-dependent layout of a virtual environment rooted at `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLayout {
    root: PathBuf,
}

impl EnvLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `bin` on Unix, `Scripts` on Windows.
    pub fn scripts_dir(&self) -> PathBuf {
        if cfg!(target_os = "windows") {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    /// Interpreter inside the environment.
    pub fn python(&self) -> PathBuf {
        if cfg!(target_os = "windows") {
            self.scripts_dir().join("python.exe")
        } else {
            self.scripts_dir().join("python")
        }
    }

    /// Activation entry point a shell would source.
    pub fn activate_script(&self) -> PathBuf {
        if cfg!(target_os = "windows") {
            self.scripts_dir().join("activate.bat")
        } else {
            self.scripts_dir().join("activate")
        }
    }

    pub fn pyvenv_cfg(&self) -> PathBuf {
        self.root.join(PYVENV_CFG)
    }

    pub fn marker(&self) -> PathBuf {
        self.root.join(ENV_MARKER_FILE)
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    /// A directory counts as a usable environment when both `pyvenv.cfg` and
    /// the interpreter are present. Anything else is a leftover to rebuild.
    pub fn is_valid(&self) -> bool {
        self.root.is_dir() && self.pyvenv_cfg().is_file() && self.python().exists()
    }

    /// Whether the directory carries any trace of a virtual environment. Only
    /// such directories may be deleted when rebuilding or cleaning.
    pub fn looks_like_env(&self) -> bool {
        self.pyvenv_cfg().exists() || self.marker().exists() || self.scripts_dir().is_dir()
    }
}
