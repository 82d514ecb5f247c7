//! Inkcheck CLI library
//!
//! Command definitions and handlers behind the `inkcheck` binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;

pub use commands::{ApproveArgs, Cli, ColorArg, Commands, DiffArgs, SummaryArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_logging;
