//! Command line interface module
//!
//! Argument parsing and the runner that executes one subcommand against the
//! registries in the inventory.

pub mod args;
pub mod runner;

pub use args::{Args, Command};
pub use runner::Runner;
