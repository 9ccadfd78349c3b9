//! Subprocess seam. Steps build an [`Invocation`] and hand it to a
//! [`CommandRunner`]; production uses [`SystemRunner`], tests a fake.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::activation::ActivatedEnv;

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(OsString, OsString)>,
    pub env_remove: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            env_remove: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Spawn inside the activated environment.
    pub fn within(mut self, env: &ActivatedEnv) -> Self {
        self.env.extend(env.vars().iter().cloned());
        self.env_remove.extend(env.removed_vars().iter().cloned());
        self
    }

    /// Args as lossy strings, for logs and audit records.
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for a in &self.args {
            write!(f, " {}", a.to_string_lossy())?;
        }
        Ok(())
    }
}

/// How an external process ended. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => f.write_str("termination by signal"),
        }
    }
}

/// Runs invocations to completion. `Err` means the process could not be started.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessExit>;
}

/// Spawns real processes with inherited stdio, so pip and venv print their own diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessExit> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(ref cwd) = invocation.cwd {
            cmd.current_dir(cwd);
        }
        for key in &invocation.env_remove {
            cmd.env_remove(key);
        }
        cmd.envs(invocation.env.iter().map(|(k, v)| (k, v)));
        tracing::debug!(command = %invocation, "Spawning");
        let status = cmd.status()?;
        Ok(ProcessExit {
            code: status.code(),
        })
    }
}
