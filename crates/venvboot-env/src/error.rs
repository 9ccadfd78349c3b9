//! One error variant per bootstrap step.

use std::fmt;
use thiserror::Error;

/// The four bootstrap steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    CreateEnvironment,
    Activate,
    UpgradeInstaller,
    InstallDependencies,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::CreateEnvironment => "create_environment",
            StepKind::Activate => "activate",
            StepKind::UpgradeInstaller => "upgrade_installer",
            StepKind::InstallDependencies => "install_dependencies",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a bootstrap step. `exit_code` is the external process's code
/// when the failure came from a process that exited normally.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Environment creation failed: {reason}")]
    EnvironmentCreation {
        reason: String,
        exit_code: Option<i32>,
    },

    #[error("Activation failed: {reason}")]
    Activation { reason: String },

    #[error("Package manager upgrade failed: {reason}")]
    InstallerUpgrade {
        reason: String,
        exit_code: Option<i32>,
    },

    #[error("Dependency install failed: {reason}")]
    DependencyInstall {
        reason: String,
        exit_code: Option<i32>,
    },
}

impl BootstrapError {
    /// The step this error belongs to.
    pub fn step(&self) -> StepKind {
        match self {
            BootstrapError::EnvironmentCreation { .. } => StepKind::CreateEnvironment,
            BootstrapError::Activation { .. } => StepKind::Activate,
            BootstrapError::InstallerUpgrade { .. } => StepKind::UpgradeInstaller,
            BootstrapError::DependencyInstall { .. } => StepKind::InstallDependencies,
        }
    }

    /// Exit code of the failing external process, if there was one.
    pub fn process_exit_code(&self) -> Option<i32> {
        match self {
            BootstrapError::EnvironmentCreation { exit_code, .. }
            | BootstrapError::InstallerUpgrade { exit_code, .. }
            | BootstrapError::DependencyInstall { exit_code, .. } => *exit_code,
            BootstrapError::Activation { .. } => None,
        }
    }

    /// Exit code for the whole tool: the process's own code, or 1.
    pub fn exit_code(&self) -> i32 {
        match self.process_exit_code() {
            Some(code) if code != 0 => code,
            _ => 1,
        }
    }
}
