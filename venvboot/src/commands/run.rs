//! `venvboot run <program> [args...]`

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use venvboot_env::activation;
use venvboot_env::{CommandRunner, EnvLayout, Invocation, SystemRunner};

use crate::observability;

/// Run `command` with the environment activated; returns the child's exit code.
pub fn cmd_run(layout: &EnvLayout, work_dir: &Path, command: &[String]) -> Result<i32> {
    let (program, args) = command.split_first().context("No command given")?;
    let env = activation::activate(layout)?;

    let invocation = Invocation::new(env.resolve_program(program))
        .args(args)
        .current_dir(work_dir)
        .within(&env);

    let start = Instant::now();
    let exit = SystemRunner
        .run(&invocation)
        .with_context(|| format!("Failed to start {}", invocation.program.display()))?;
    let duration_ms = start.elapsed().as_millis() as u64;
    observability::audit_command_completed(program, args, exit.code, duration_ms);

    if !exit.success() {
        tracing::debug!(command = %invocation, status = %exit, "Command failed");
    }
    Ok(match exit.code {
        Some(code) => code,
        None => 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_env(layout: &EnvLayout) {
        fs::create_dir_all(layout.scripts_dir()).unwrap();
        fs::write(layout.python(), "").unwrap();
        fs::write(layout.activate_script(), "").unwrap();
        fs::write(layout.pyvenv_cfg(), "home = /usr/bin\n").unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_run_returns_child_exit_code() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let layout = EnvLayout::new(tmp.path().join("venv"));
        make_env(&layout);
        let script = layout.scripts_dir().join("exit7");
        fs::write(&script, "#!/bin/sh\nexit 7\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let code = cmd_run(&layout, tmp.path(), &["exit7".to_string()]).unwrap();
        assert_eq!(code, 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_sees_activated_environment() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let layout = EnvLayout::new(tmp.path().join("venv"));
        make_env(&layout);
        let script = layout.scripts_dir().join("check-venv");
        fs::write(&script, "#!/bin/sh\n[ -n \"$VIRTUAL_ENV\" ] || exit 3\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let code = cmd_run(&layout, tmp.path(), &["check-venv".to_string()]).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_run_without_environment_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = EnvLayout::new(tmp.path().join("venv"));
        assert!(cmd_run(&layout, tmp.path(), &["python".to_string()]).is_err());
    }

    #[test]
    fn test_run_requires_a_command() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = EnvLayout::new(tmp.path().join("venv"));
        make_env(&layout);
        assert!(cmd_run(&layout, tmp.path(), &[]).is_err());
    }
}
