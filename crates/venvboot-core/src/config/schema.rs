//! Typed configuration structs, grouped by concern.

use super::env_keys::{bootstrap as boot_keys, observability as obv_keys};
use super::loader::{env_bool, env_optional, env_or};

/// Environment directory created in the working directory.
pub const DEFAULT_ENV_DIR: &str = "venv";
/// Requirements manifest read from the working directory.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// What to bootstrap and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Interpreter for `-m venv`; `None` means discover `python3`/`python` on PATH.
    pub python: Option<String>,
    pub env_dir: String,
    pub manifest: String,
    /// Treat a failed `pip` self-upgrade as a warning instead of aborting.
    pub allow_upgrade_failure: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            python: None,
            env_dir: DEFAULT_ENV_DIR.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
            allow_upgrade_failure: false,
        }
    }
}

impl BootstrapConfig {
    /// Load from environment variables (loads `.env` first).
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            python: env_optional(boot_keys::VENVBOOT_PYTHON, &[]),
            env_dir: env_or(boot_keys::VENVBOOT_ENV_DIR, &[], || {
                DEFAULT_ENV_DIR.to_string()
            }),
            manifest: env_or(boot_keys::VENVBOOT_MANIFEST, boot_keys::MANIFEST_ALIASES, || {
                DEFAULT_MANIFEST.to_string()
            }),
            allow_upgrade_failure: env_bool(
                boot_keys::VENVBOOT_ALLOW_UPGRADE_FAILURE,
                &[],
                false,
            ),
        }
    }

    /// Apply CLI flags on top; `None`/`false` keeps the loaded value.
    pub fn with_cli_overrides(
        mut self,
        python: Option<String>,
        env_dir: Option<String>,
        manifest: Option<String>,
        allow_upgrade_failure: bool,
    ) -> Self {
        if python.is_some() {
            self.python = python;
        }
        if let Some(dir) = env_dir {
            self.env_dir = dir;
        }
        if let Some(m) = manifest {
            self.manifest = m;
        }
        self.allow_upgrade_failure |= allow_upgrade_failure;
        self
    }
}

/// Observability: quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::VENVBOOT_QUIET, &[], false),
                log_level: env_or(obv_keys::VENVBOOT_LOG_LEVEL, &[], || {
                    "venvboot=info,venvboot_env=info".to_string()
                }),
                log_json: env_bool(obv_keys::VENVBOOT_LOG_JSON, &[], false),
                audit_log: env_optional(obv_keys::VENVBOOT_AUDIT_LOG, &[]),
            }
        })
    }
}
