//! Command-line surface: argument parsing, command dispatch, and text output.

pub mod cli;
pub mod render;

pub use cli::{Cli, CliContext, Commands};
