//! Environment variable key constants and aliases.
//!
//! Primary keys use the `VENVBOOT_*` prefix. Aliases are read as fallbacks.

/// Bootstrap behaviour
pub mod bootstrap {
    /// Interpreter used to create the environment (`python -m venv`).
    pub const VENVBOOT_PYTHON: &str = "VENVBOOT_PYTHON";

    pub const VENVBOOT_ENV_DIR: &str = "VENVBOOT_ENV_DIR";

    pub const VENVBOOT_MANIFEST: &str = "VENVBOOT_MANIFEST";
    pub const MANIFEST_ALIASES: &[&str] = &["VENVBOOT_REQUIREMENTS"];

    pub const VENVBOOT_ALLOW_UPGRADE_FAILURE: &str = "VENVBOOT_ALLOW_UPGRADE_FAILURE";
}

/// Observability and logging
pub mod observability {
    pub const VENVBOOT_QUIET: &str = "VENVBOOT_QUIET";
    pub const VENVBOOT_LOG_LEVEL: &str = "VENVBOOT_LOG_LEVEL";
    pub const VENVBOOT_LOG_JSON: &str = "VENVBOOT_LOG_JSON";
    pub const VENVBOOT_AUDIT_LOG: &str = "VENVBOOT_AUDIT_LOG";
}
