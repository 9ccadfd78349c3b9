use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// venvboot - create a Python virtual environment and install its requirements
///
/// With no subcommand: create `venv/`, activate it, upgrade pip and install
/// `requirements.txt`, stopping at the first step that fails.
#[derive(Parser, Debug)]
#[command(name = "venvboot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Project directory holding the manifest (default: current directory)
    #[arg(short = 'C', long = "dir", value_name = "DIR", global = true)]
    pub dir: Option<PathBuf>,

    /// Environment directory name (default: from env or "venv")
    #[arg(long, value_name = "NAME", global = true)]
    pub env_dir: Option<String>,

    /// Requirements manifest (default: from env or "requirements.txt")
    #[arg(long, value_name = "FILE", global = true)]
    pub manifest: Option<String>,

    /// Interpreter used to create the environment (default: python3/python on PATH)
    #[arg(long, value_name = "PATH", global = true)]
    pub python: Option<String>,

    /// Remove an existing environment and build it from scratch
    #[arg(long, default_value = "false")]
    pub recreate: bool,

    /// Keep going when upgrading pip fails
    #[arg(long, default_value = "false")]
    pub allow_upgrade_failure: bool,

    /// Only bootstrap when the environment directory does not exist yet
    #[arg(long, default_value = "false", conflicts_with = "recreate")]
    pub if_missing: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show whether the environment exists, is complete and matches the manifest
    Status {
        /// Print as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Remove the environment directory
    Clean {
        /// Show what would be removed without deleting
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Run a command inside the activated environment
    Run {
        /// Program and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}
