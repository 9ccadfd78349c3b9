//! Shared configuration for the venvboot workspace.

pub mod config;
