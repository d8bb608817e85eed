//! Fieldnote CLI
//!
//! Command-line front end for the field-note engine: capture, show,
//! resolve, recap, ingest, export, and site directory maintenance.

pub mod cli;
pub mod config;
pub mod error;
pub mod ops;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
