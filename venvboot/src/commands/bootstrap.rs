//! Default command: create, activate, upgrade pip, install the manifest.

use venvboot_env::{BootstrapPlan, Bootstrapper, SystemRunner};

use crate::observability::{self, AuditObserver};

/// Returns the process exit code: 0, or the failing step's code.
pub fn cmd_bootstrap(plan: BootstrapPlan, if_missing: bool) -> i32 {
    if if_missing && plan.layout().exists() {
        tracing::info!(
            env_dir = %plan.env_dir.display(),
            "Environment directory already present, nothing to do"
        );
        return 0;
    }

    observability::audit_bootstrap_started(&plan.env_dir, &plan.manifest);
    let runner = SystemRunner;
    let bootstrapper = Bootstrapper::new(plan, &runner);
    let code = match bootstrapper.run(&mut AuditObserver) {
        Ok(report) => {
            tracing::info!(
                env_dir = %report.env.root().display(),
                python = %report.env.python().display(),
                "Environment ready"
            );
            0
        }
        // pip/venv already printed their diagnostics; the pipeline logged the step.
        Err(e) => e.exit_code(),
    };
    observability::audit_bootstrap_finished(&bootstrapper.plan().env_dir, code);
    code
}
