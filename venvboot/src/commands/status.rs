//! `venvboot status`

use anyhow::Result;
use venvboot_env::{BootstrapPlan, EnvStatus};

/// Print the environment state. Exit code 0 only when complete and up to date.
pub fn cmd_status(plan: &BootstrapPlan, json: bool) -> Result<i32> {
    let status = EnvStatus::inspect(plan)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        for line in render(&status) {
            println!("{}", line);
        }
    }

    Ok(if status.is_up_to_date() { 0 } else { 1 })
}

fn render(status: &EnvStatus) -> Vec<String> {
    let mut lines = vec![format!("Environment: {}", status.env_dir.display())];
    if !status.exists {
        lines.push("  state: missing".to_string());
    } else if !status.valid {
        lines.push("  state: incomplete (will be rebuilt on next bootstrap)".to_string());
    } else if !status.is_complete() {
        lines.push("  state: created, dependencies not installed".to_string());
    } else if status.is_up_to_date() {
        lines.push("  state: ready".to_string());
    } else {
        lines.push("  state: manifest changed since last install".to_string());
    }
    if let Some(ref python) = status.python {
        lines.push(format!("  python: {}", python.display()));
    }
    match status.manifest_sha256 {
        Some(_) => lines.push(format!("  manifest: {}", status.manifest.display())),
        None => lines.push(format!("  manifest: {} (not found)", status.manifest.display())),
    }
    if let Some(ref marker) = status.marker {
        lines.push(format!("  installed at: {}", marker.completed_at));
    }
    lines
}
