//! Argument parsing for the `license-admin` binary.

pub mod args;

pub use args::{Cli, Commands};
