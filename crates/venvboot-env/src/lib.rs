//! Python virtual environment bootstrapper.
//!
//! The work is an ordered list of [`steps::Step`]s (create, activate, upgrade
//! pip, install the manifest) run by [`pipeline::Bootstrapper`], which stops at
//! the first failure. Activation does not touch the current process: it yields
//! an [`activation::ActivatedEnv`] value that later subprocesses are spawned with.

pub mod activation;
pub mod error;
pub mod interpreter;
pub mod layout;
pub mod marker;
pub mod pipeline;
pub mod runner;
pub mod status;
pub mod steps;

#[cfg(test)]
pub(crate) mod testing;


pub use activation::ActivatedEnv;
pub use error::{BootstrapError, StepKind};
pub use layout::EnvLayout;
pub use pipeline::{
    BootstrapPlan, BootstrapReport, Bootstrapper, NoopObserver, StepObserver, StepRecord,
};
pub use runner::{CommandRunner, Invocation, ProcessExit, SystemRunner};
pub use status::EnvStatus;
pub use steps::StepOutcome;
