//! Tooling & Integration Layer
//!
//! Command-line shell around the scan pipeline.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, CommandOutput, Commands};
