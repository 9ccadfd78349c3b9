//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::layout::EnvLayout;
use crate::runner::{CommandRunner, Invocation, ProcessExit};

/// Lay down the files `python -m venv` would create, enough for activation.
pub fn materialize_env(layout: &EnvLayout) {
    fs::create_dir_all(layout.scripts_dir()).unwrap();
    fs::write(layout.python(), "").unwrap();
    fs::write(layout.activate_script(), "").unwrap();
    fs::write(layout.pyvenv_cfg(), "home = /usr/bin\n").unwrap();
}

/// Scripted result for one call to the fake runner.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Exit(i32),
    Signal,
    SpawnError,
}

/// Records invocations and answers them from a queue (default: exit 0).
/// A successful `-m venv <dir>` call materializes the environment on disk.
#[derive(Default)]
pub struct FakeRunner {
    replies: RefCell<VecDeque<Reply>>,
    pub calls: RefCell<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: &[Reply]) -> Self {
        Self {
            replies: RefCell::new(replies.iter().copied().collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Args of the n-th call, lossy.
    pub fn args(&self, n: usize) -> Vec<String> {
        self.calls.borrow()[n].display_args()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessExit> {
        self.calls.borrow_mut().push(invocation.clone());
        let reply = self.replies.borrow_mut().pop_front().unwrap_or(Reply::Exit(0));
        match reply {
            Reply::SpawnError => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
            Reply::Signal => Ok(ProcessExit { code: None }),
            Reply::Exit(code) => {
                let args = invocation.display_args();
                if code == 0 && args.len() == 3 && args[0] == "-m" && args[1] == "venv" {
                    materialize_env(&EnvLayout::new(PathBuf::from(&args[2])));
                }
                Ok(ProcessExit { code: Some(code) })
            }
        }
    }
}
