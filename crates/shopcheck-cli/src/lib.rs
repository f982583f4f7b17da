//! shopcheck CLI library
//!
//! Command definitions, handlers and output helpers behind the `shopcheck`
//! binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    CheckArgs, Cli, ColorArg, Commands, EvidenceArgs, EvidenceCommand, FormatArg, KindArg,
    ListArgs, RegistrySource, ShowArgs, TemplatesCommand,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
