//! Observability: tracing init and the JSONL audit log.
//!
//! Uses config::ObservabilityConfig for VENVBOOT_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};
use venvboot_core::config::ObservabilityConfig;
use venvboot_env::{BootstrapError, StepKind, StepObserver, StepOutcome};

/// Initialize tracing on stderr. Call once at startup, after `.env` is loaded.
/// When VENVBOOT_QUIET=1, only WARN and above are logged.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "venvboot=warn,venvboot_env=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
    };
}

fn audit_path() -> Option<&'static str> {
    let path = ObservabilityConfig::from_env().audit_log.as_deref()?;
    if let Some(parent) = Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    Some(path)
}

fn append_jsonl(path: &str, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Audit: a bootstrap run is about to start.
pub fn audit_bootstrap_started(env_dir: &Path, manifest: &Path) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "bootstrap_started",
            "env_dir": env_dir.display().to_string(),
            "manifest": manifest.display().to_string(),
        });
        append_jsonl(path, &record);
    }
}

/// Audit: a bootstrap run ended (`exit_code` 0 on success).
pub fn audit_bootstrap_finished(env_dir: &Path, exit_code: i32) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "bootstrap_finished",
            "env_dir": env_dir.display().to_string(),
            "exit_code": exit_code,
            "success": exit_code == 0,
        });
        append_jsonl(path, &record);
    }
}

/// Audit: `venvboot run` finished a command inside the environment.
pub fn audit_command_completed(
    cmd: &str,
    args: &[String],
    exit_code: Option<i32>,
    duration_ms: u64,
) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "command_completed",
            "cmd": cmd,
            "args": args,
            "exit_code": exit_code,
            "duration_ms": duration_ms,
        });
        append_jsonl(path, &record);
    }
}

/// Writes one audit record per step start and finish.
#[derive(Debug, Default)]
pub struct AuditObserver;

impl StepObserver for AuditObserver {
    fn step_started(&mut self, step: StepKind) {
        if let Some(path) = audit_path() {
            let record = json!({
                "ts": now(),
                "event": "step_started",
                "step": step.as_str(),
            });
            append_jsonl(path, &record);
        }
    }

    fn step_finished(
        &mut self,
        step: StepKind,
        result: Result<&StepOutcome, &BootstrapError>,
        elapsed: Duration,
    ) {
        let Some(path) = audit_path() else {
            return;
        };
        let mut record = json!({
            "ts": now(),
            "event": "step_finished",
            "step": step.as_str(),
            "duration_ms": elapsed.as_millis() as u64,
            "success": result.is_ok(),
        });
        match result {
            Ok(StepOutcome::Completed) => {
                record["outcome"] = json!("completed");
            }
            Ok(StepOutcome::Skipped(reason)) => {
                record["outcome"] = json!("skipped");
                record["reason"] = json!(reason);
            }
            Ok(StepOutcome::Tolerated(reason)) => {
                record["outcome"] = json!("tolerated");
                record["reason"] = json!(reason);
            }
            Err(e) => {
                record["error"] = json!(e.to_string());
                record["exit_code"] = json!(e.process_exit_code());
            }
        }
        append_jsonl(path, &record);
    }
}
