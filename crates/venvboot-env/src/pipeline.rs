//! Ordered, fail-fast step execution.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use venvboot_core::config::BootstrapConfig;

use crate::activation::ActivatedEnv;
use crate::error::{BootstrapError, StepKind};
use crate::layout::EnvLayout;
use crate::runner::CommandRunner;
use crate::steps::{self, BootstrapContext, Step, StepOutcome};

/// Resolved inputs of one bootstrap run. All paths are absolute or relative
/// to the same working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    pub work_dir: PathBuf,
    pub env_dir: PathBuf,
    pub manifest: PathBuf,
    pub python: Option<PathBuf>,
    /// Remove an existing environment before creating it.
    pub recreate: bool,
    pub allow_upgrade_failure: bool,
}

impl BootstrapPlan {
    /// Resolve `cfg` against `work_dir`.
    pub fn from_config(work_dir: &Path, cfg: &BootstrapConfig) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            env_dir: work_dir.join(&cfg.env_dir),
            manifest: work_dir.join(&cfg.manifest),
            python: cfg.python.as_ref().map(PathBuf::from),
            recreate: false,
            allow_upgrade_failure: cfg.allow_upgrade_failure,
        }
    }

    pub fn with_recreate(mut self, recreate: bool) -> Self {
        self.recreate = recreate;
        self
    }

    pub fn layout(&self) -> EnvLayout {
        EnvLayout::new(&self.env_dir)
    }
}

/// Hooks around each step (audit log, progress output).
pub trait StepObserver {
    fn step_started(&mut self, _step: StepKind) {}

    fn step_finished(
        &mut self,
        _step: StepKind,
        _result: Result<&StepOutcome, &BootstrapError>,
        _elapsed: Duration,
    ) {
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: StepKind,
    pub outcome: StepOutcome,
    pub elapsed_ms: u64,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub env: ActivatedEnv,
    pub steps: Vec<StepRecord>,
}

/// Runs the steps in order and stops at the first error.
pub struct Bootstrapper<'a> {
    plan: BootstrapPlan,
    runner: &'a dyn CommandRunner,
    steps: Vec<Box<dyn Step>>,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(plan: BootstrapPlan, runner: &'a dyn CommandRunner) -> Self {
        Self {
            plan,
            runner,
            steps: steps::default_steps(),
        }
    }

    pub fn plan(&self) -> &BootstrapPlan {
        &self.plan
    }

    pub fn run(&self, observer: &mut dyn StepObserver) -> Result<BootstrapReport, BootstrapError> {
        let mut ctx = BootstrapContext::new(&self.plan, self.runner);
        let mut records = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let kind = step.kind();
            let _span = tracing::info_span!("step", step = %kind).entered();
            tracing::info!("Starting");
            observer.step_started(kind);

            let start = Instant::now();
            let result = step.run(&mut ctx);
            let elapsed = start.elapsed();
            observer.step_finished(kind, result.as_ref(), elapsed);

            match result {
                Ok(outcome) => {
                    tracing::info!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        outcome = ?outcome,
                        "Finished"
                    );
                    records.push(StepRecord {
                        step: kind,
                        outcome,
                        elapsed_ms: elapsed.as_millis() as u64,
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "Step failed, aborting");
                    return Err(e);
                }
            }
        }

        let env = ctx.into_activated().ok_or_else(|| BootstrapError::Activation {
            reason: "pipeline finished without activating the environment".to_string(),
        })?;
        Ok(BootstrapReport {
            env,
            steps: records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{materialize_env, FakeRunner, Reply};
    use std::fs;

    #[derive(Default)]
    struct Recorder {
        started: Vec<StepKind>,
        failed: Vec<StepKind>,
    }

    impl StepObserver for Recorder {
        fn step_started(&mut self, step: StepKind) {
            self.started.push(step);
        }

        fn step_finished(
            &mut self,
            step: StepKind,
            result: Result<&StepOutcome, &BootstrapError>,
            _elapsed: Duration,
        ) {
            if result.is_err() {
                self.failed.push(step);
            }
        }
    }

    fn plan_in(dir: &Path) -> BootstrapPlan {
        let cfg = BootstrapConfig {
            python: Some("/usr/bin/python3".to_string()),
            ..BootstrapConfig::default()
        };
        BootstrapPlan::from_config(dir, &cfg)
    }

    #[test]
    fn test_from_config_joins_work_dir() {
        let plan = BootstrapPlan::from_config(Path::new("/proj"), &BootstrapConfig::default());
        assert_eq!(plan.env_dir, PathBuf::from("/proj/venv"));
        assert_eq!(plan.manifest, PathBuf::from("/proj/requirements.txt"));
        assert_eq!(plan.python, None);
        assert!(!plan.recreate);
    }

    #[test]
    fn test_full_run_executes_steps_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("requirements.txt"), "requests==2.31.0\n").unwrap();
        let runner = FakeRunner::new();
        let boot = Bootstrapper::new(plan_in(tmp.path()), &runner);
        let mut rec = Recorder::default();

        let report = boot.run(&mut rec).unwrap();
        assert_eq!(
            rec.started,
            [
                StepKind::CreateEnvironment,
                StepKind::Activate,
                StepKind::UpgradeInstaller,
                StepKind::InstallDependencies
            ]
        );
        assert!(rec.failed.is_empty());
        assert_eq!(report.steps.len(), 4);
        assert_eq!(report.env.root(), tmp.path().join("venv"));

        assert_eq!(runner.call_count(), 3);
        assert_eq!(runner.args(0)[1], "venv");
        assert_eq!(runner.args(1)[4], "pip");
        assert_eq!(runner.args(2)[3], "-r");
    }

    #[test]
    fn test_create_failure_never_attempts_activation() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("requirements.txt"), "requests\n").unwrap();
        let runner = FakeRunner::with_replies(&[Reply::Exit(1)]);
        let boot = Bootstrapper::new(plan_in(tmp.path()), &runner);
        let mut rec = Recorder::default();

        let err = boot.run(&mut rec).unwrap_err();
        assert_eq!(err.step(), StepKind::CreateEnvironment);
        assert_eq!(rec.started, [StepKind::CreateEnvironment]);
        assert_eq!(rec.failed, [StepKind::CreateEnvironment]);
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn test_missing_manifest_fails_install_step() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new();
        let boot = Bootstrapper::new(plan_in(tmp.path()), &runner);

        let err = boot.run(&mut NoopObserver).unwrap_err();
        assert_eq!(err.step(), StepKind::InstallDependencies);
        assert_ne!(err.exit_code(), 0);
        // venv + pip upgrade only
        assert_eq!(runner.call_count(), 2);
    }

    #[test]
    fn test_upgrade_failure_is_fatal_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("requirements.txt"), "requests\n").unwrap();
        let runner = FakeRunner::with_replies(&[Reply::Exit(0), Reply::Exit(2)]);
        let boot = Bootstrapper::new(plan_in(tmp.path()), &runner);

        let err = boot.run(&mut NoopObserver).unwrap_err();
        assert_eq!(err.step(), StepKind::UpgradeInstaller);
        assert_eq!(err.exit_code(), 2);
        assert_eq!(runner.call_count(), 2);
    }

    #[test]
    fn test_upgrade_failure_tolerated_continues_to_install() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("requirements.txt"), "requests\n").unwrap();
        let runner = FakeRunner::with_replies(&[Reply::Exit(0), Reply::Signal]);
        let mut plan = plan_in(tmp.path());
        plan.allow_upgrade_failure = true;
        let boot = Bootstrapper::new(plan, &runner);

        let report = boot.run(&mut NoopObserver).unwrap();
        assert!(matches!(report.steps[2].outcome, StepOutcome::Tolerated(_)));
        assert_eq!(runner.call_count(), 3);
    }

    #[test]
    fn test_rerun_on_existing_environment_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("requirements.txt"), "requests\n").unwrap();
        let plan = plan_in(tmp.path());
        materialize_env(&plan.layout());
        let runner = FakeRunner::new();
        let boot = Bootstrapper::new(plan, &runner);

        let first = boot.run(&mut NoopObserver).unwrap();
        let second = boot.run(&mut NoopObserver).unwrap();
        assert!(matches!(first.steps[0].outcome, StepOutcome::Skipped(_)));
        assert!(matches!(second.steps[0].outcome, StepOutcome::Skipped(_)));
        // upgrade + install per run, no venv call
        assert_eq!(runner.call_count(), 4);
    }

    #[test]
    fn test_install_failure_exit_code_propagates() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("requirements.txt"), "requests\n").unwrap();
        let runner =
            FakeRunner::with_replies(&[Reply::Exit(0), Reply::Exit(0), Reply::Exit(23)]);
        let boot = Bootstrapper::new(plan_in(tmp.path()), &runner);

        let err = boot.run(&mut NoopObserver).unwrap_err();
        assert_eq!(err.exit_code(), 23);
    }

    #[test]
    fn test_env_dir_pointing_at_project_leaves_it_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("requirements.txt"), "requests\n").unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/app.py"), "print('hi')\n").unwrap();
        let cfg = BootstrapConfig {
            python: Some("/usr/bin/python3".to_string()),
            env_dir: ".".to_string(),
            ..BootstrapConfig::default()
        };
        let runner = FakeRunner::new();
        let boot = Bootstrapper::new(BootstrapPlan::from_config(tmp.path(), &cfg), &runner);
        let mut rec = Recorder::default();

        let err = boot.run(&mut rec).unwrap_err();
        assert_eq!(err.step(), StepKind::CreateEnvironment);
        assert_eq!(err.exit_code(), 1);
        assert_eq!(rec.started, [StepKind::CreateEnvironment]);
        assert_eq!(runner.call_count(), 0);
        assert!(tmp.path().join("requirements.txt").exists());
        assert!(tmp.path().join("src/app.py").exists());
    }
}
