//! Sheetlift CLI library.
//!
//! This library provides the core functionality for the `sheetlift` command-line
//! interface: argument parsing, configuration loading, provider setup and the
//! extract, batch and aggregate commands.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod provider;

pub use cli::{Cli, Command};
pub use config::{Config, ProviderKind};
pub use error::{CliError, Result};
pub use provider::{build_provider, resolve_api_key, DynProvider};
