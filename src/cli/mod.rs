//! Command-line interface module.

mod args;
pub mod run;
pub mod watch;

pub use args::{Cli, Commands, InputArgs};
