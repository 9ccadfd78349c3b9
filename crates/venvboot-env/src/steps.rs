//! The four bootstrap steps.
//!
//! Each step gets the shared [`BootstrapContext`] and returns a
//! [`StepOutcome`] or the [`BootstrapError`] variant that belongs to it.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::activation::{self, ActivatedEnv};
use crate::error::{BootstrapError, StepKind};
use crate::interpreter;
use crate::marker::{self, CompletionMarker};
use crate::pipeline::BootstrapPlan;
use crate::runner::{CommandRunner, Invocation, ProcessExit};

/// How a step finished without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Nothing to do (existing environment, empty manifest).
    Skipped(String),
    /// Failed, but configured as non-fatal.
    Tolerated(String),
}

/// State threaded through the steps of one run.
pub struct BootstrapContext<'a> {
    pub plan: &'a BootstrapPlan,
    pub runner: &'a dyn CommandRunner,
    activated: Option<ActivatedEnv>,
}

impl<'a> BootstrapContext<'a> {
    pub fn new(plan: &'a BootstrapPlan, runner: &'a dyn CommandRunner) -> Self {
        Self {
            plan,
            runner,
            activated: None,
        }
    }

    /// The activated environment; steps after activation call this.
    pub fn activated(&self) -> Result<&ActivatedEnv, BootstrapError> {
        self.activated.as_ref().ok_or_else(|| BootstrapError::Activation {
            reason: "environment has not been activated".to_string(),
        })
    }

    pub fn into_activated(self) -> Option<ActivatedEnv> {
        self.activated
    }
}

/// One unit of the pipeline.
pub trait Step {
    fn kind(&self) -> StepKind;
    fn run(&self, ctx: &mut BootstrapContext<'_>) -> Result<StepOutcome, BootstrapError>;
}

/// Run `invocation`, mapping spawn failure or nonzero exit through `make_err`.
fn run_checked<F>(
    ctx: &BootstrapContext<'_>,
    invocation: &Invocation,
    make_err: F,
) -> Result<(), BootstrapError>
where
    F: Fn(String, Option<i32>) -> BootstrapError,
{
    match ctx.runner.run(invocation) {
        Ok(exit) if exit.success() => Ok(()),
        Ok(ProcessExit { code }) => Err(make_err(
            format!("`{}` failed with {}", invocation, ProcessExit { code }),
            code,
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(make_err(
            format!(
                "`{}` could not be started: program not found",
                invocation.program.display()
            ),
            None,
        )),
        Err(e) => Err(make_err(
            format!("`{}` could not be started: {}", invocation.program.display(), e),
            None,
        )),
    }
}

/// `python -m venv <dir>`, reusing a valid environment and rebuilding a broken one.
pub struct CreateEnvironment;

impl Step for CreateEnvironment {
    fn kind(&self) -> StepKind {
        StepKind::CreateEnvironment
    }

    fn run(&self, ctx: &mut BootstrapContext<'_>) -> Result<StepOutcome, BootstrapError> {
        let plan = ctx.plan;
        let layout = plan.layout();
        check_env_dir(plan)?;

        if layout.is_valid() && !plan.recreate {
            tracing::info!(env_dir = %layout.root().display(), "Reusing existing environment");
            return Ok(StepOutcome::Skipped("environment already exists".to_string()));
        }

        if layout.exists() {
            if !layout.looks_like_env() {
                return Err(BootstrapError::EnvironmentCreation {
                    reason: format!(
                        "{} exists but is not a virtual environment; not removing it",
                        layout.root().display()
                    ),
                    exit_code: None,
                });
            }
            if plan.recreate {
                tracing::info!(
                    env_dir = %layout.root().display(),
                    "Removing environment for recreation"
                );
            } else {
                tracing::warn!(
                    env_dir = %layout.root().display(),
                    "Directory is not a complete environment, rebuilding"
                );
            }
            fs::remove_dir_all(layout.root()).map_err(|e| BootstrapError::EnvironmentCreation {
                reason: format!("cannot remove {}: {}", layout.root().display(), e),
                exit_code: None,
            })?;
        }

        let python = interpreter::resolve(plan.python.as_deref())?;
        let invocation = Invocation::new(python)
            .args(["-m", "venv"])
            .arg(layout.root())
            .current_dir(&plan.work_dir);
        run_checked(ctx, &invocation, |reason, exit_code| {
            BootstrapError::EnvironmentCreation { reason, exit_code }
        })?;
        Ok(StepOutcome::Completed)
    }
}

/// Refuse an environment directory that would take the project with it: the
/// working directory, one of its ancestors, or anything holding the manifest.
fn check_env_dir(plan: &BootstrapPlan) -> Result<(), BootstrapError> {
    let env_dir = normalize(&plan.env_dir);
    let what = if normalize(&plan.work_dir).starts_with(&env_dir) {
        "the working directory"
    } else if normalize(&plan.manifest).starts_with(&env_dir) {
        "the manifest"
    } else {
        return Ok(());
    };
    Err(BootstrapError::EnvironmentCreation {
        reason: format!(
            "refusing to use {} as the environment directory: it contains {}",
            plan.env_dir.display(),
            what
        ),
        exit_code: None,
    })
}

/// Canonical form when the path (or its parent) exists, lexical otherwise.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(p) = fs::canonicalize(path) {
        return p;
    }
    let lexical = lexical_normalize(path);
    match (lexical.parent(), lexical.file_name()) {
        (Some(parent), Some(name)) => match fs::canonicalize(parent) {
            Ok(p) => p.join(name),
            Err(_) => lexical,
        },
        _ => lexical,
    }
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve the environment's interpreter and the child-process overrides.
pub struct Activate;

impl Step for Activate {
    fn kind(&self) -> StepKind {
        StepKind::Activate
    }

    fn run(&self, ctx: &mut BootstrapContext<'_>) -> Result<StepOutcome, BootstrapError> {
        let env = activation::activate(&ctx.plan.layout())?;
        tracing::debug!(python = %env.python().display(), "Activated environment");
        ctx.activated = Some(env);
        Ok(StepOutcome::Completed)
    }
}

/// `python -m pip install --upgrade pip` inside the environment.
pub struct UpgradeInstaller;

impl Step for UpgradeInstaller {
    fn kind(&self) -> StepKind {
        StepKind::UpgradeInstaller
    }

    fn run(&self, ctx: &mut BootstrapContext<'_>) -> Result<StepOutcome, BootstrapError> {
        let env = ctx.activated()?;
        let invocation = Invocation::new(env.python())
            .args(["-m", "pip", "install", "--upgrade", "pip"])
            .current_dir(&ctx.plan.work_dir)
            .within(env);
        match run_checked(ctx, &invocation, |reason, exit_code| {
            BootstrapError::InstallerUpgrade { reason, exit_code }
        }) {
            Ok(()) => Ok(StepOutcome::Completed),
            Err(e) if ctx.plan.allow_upgrade_failure => {
                tracing::warn!(error = %e, "Continuing without pip upgrade");
                Ok(StepOutcome::Tolerated(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

/// `python -m pip install -r <manifest>`, then write the completion marker.
pub struct InstallDependencies;

impl Step for InstallDependencies {
    fn kind(&self) -> StepKind {
        StepKind::InstallDependencies
    }

    fn run(&self, ctx: &mut BootstrapContext<'_>) -> Result<StepOutcome, BootstrapError> {
        let plan = ctx.plan;
        let env = ctx.activated()?;

        if !plan.manifest.is_file() {
            return Err(BootstrapError::DependencyInstall {
                reason: format!("manifest {} not found", plan.manifest.display()),
                exit_code: None,
            });
        }
        let content = fs::read_to_string(&plan.manifest).map_err(|e| {
            BootstrapError::DependencyInstall {
                reason: format!("cannot read {}: {}", plan.manifest.display(), e),
                exit_code: None,
            }
        })?;

        let outcome = if has_requirements(&content) {
            let invocation = Invocation::new(env.python())
                .args(["-m", "pip", "install", "-r"])
                .arg(&plan.manifest)
                .current_dir(&plan.work_dir)
                .within(env);
            run_checked(ctx, &invocation, |reason, exit_code| {
                BootstrapError::DependencyInstall { reason, exit_code }
            })?;
            StepOutcome::Completed
        } else {
            tracing::info!(manifest = %plan.manifest.display(), "Manifest lists no packages");
            StepOutcome::Skipped("manifest is empty".to_string())
        };

        let digest = marker::manifest_digest(&plan.manifest).unwrap_or(None);
        if let Err(e) = marker::write(&plan.layout(), &CompletionMarker::new(digest)) {
            tracing::warn!(error = %e, "Could not record completion marker");
        }
        Ok(outcome)
    }
}

/// True when any line is more than whitespace or a `#` comment.
fn has_requirements(manifest: &str) -> bool {
    manifest
        .lines()
        .map(str::trim)
        .any(|l| !l.is_empty() && !l.starts_with('#'))
}

/// Steps in execution order.
pub fn default_steps() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(CreateEnvironment),
        Box::new(Activate),
        Box::new(UpgradeInstaller),
        Box::new(InstallDependencies),
    ]
}
