mod cli;
mod commands;
mod observability;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use venvboot_core::config::{self, BootstrapConfig};
use venvboot_env::BootstrapPlan;

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let work_dir = resolve_work_dir(cli.dir.as_deref())?;
    // .env must be in the process environment before any config is read.
    config::load_dotenv_from_dir(&work_dir);
    observability::init_tracing();

    let cfg = BootstrapConfig::from_env().with_cli_overrides(
        cli.python,
        cli.env_dir,
        cli.manifest,
        cli.allow_upgrade_failure,
    );
    let plan = BootstrapPlan::from_config(&work_dir, &cfg).with_recreate(cli.recreate);
    tracing::debug!(?plan, "Resolved plan");

    match cli.command {
        None => Ok(commands::bootstrap::cmd_bootstrap(plan, cli.if_missing)),
        Some(Commands::Status { json }) => commands::status::cmd_status(&plan, json),
        Some(Commands::Clean { dry_run, force }) => {
            commands::clean::cmd_clean(&plan.layout(), dry_run, force)?;
            Ok(0)
        }
        Some(Commands::Run { command }) => {
            commands::run::cmd_run(&plan.layout(), &plan.work_dir, &command)
        }
    }
}

/// Absolute project directory: `--dir` (relative to cwd) or cwd itself.
fn resolve_work_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let dir = match dir {
        Some(d) if d.is_absolute() => d.to_path_buf(),
        Some(d) => cwd.join(d),
        None => cwd,
    };
    if !dir.is_dir() {
        anyhow::bail!("Project directory {} does not exist", dir.display());
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_work_dir_absolute() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(resolve_work_dir(Some(tmp.path())).unwrap(), tmp.path());
    }

    #[test]
    fn test_resolve_work_dir_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(resolve_work_dir(Some(&missing)).is_err());
    }

    #[test]
    fn test_resolve_work_dir_defaults_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_work_dir(None).unwrap(), cwd);
    }
}
