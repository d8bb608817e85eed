//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Field-note capture, reconciliation, and recap from the command line.
#[derive(Parser, Debug)]
#[command(name = "fieldnote", version, about)]
pub struct Cli {
    /// User id the session is keyed by (overrides the config file)
    #[arg(long, env = "FIELDNOTE_USER")]
    pub user: Option<String>,

    /// Database file (overrides the config file)
    #[arg(long)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture free-text notes, e.g. "site MAOS_EP genset turun lagi"
    Capture {
        /// The note text
        text: Vec<String>,
    },

    /// Show notes by site and/or date, or the merged session view
    Show {
        /// The query text, e.g. "site maos_ep date 4 august 2025"
        text: Vec<String>,
    },

    /// Close open notes matching a resolution statement
    Resolve {
        /// The statement, e.g. "site maos_ep genset sudah diperbaiki"
        text: Vec<String>,
    },

    /// Summarize notes per site for a date window
    Recap {
        /// The window expression, e.g. "this week" or "bulan agustus"
        text: Vec<String>,
    },

    /// Export the session's current notes to a file
    Export {
        /// Output format: txt or pdf
        format: String,
    },

    /// Parse a plain-text document and persist the recognized notes
    Ingest {
        /// Path to the text file
        file: PathBuf,

        /// Target site identifier
        site: String,

        /// Display label stored with the notes
        #[arg(long)]
        name: Option<String>,
    },

    /// Site directory maintenance
    Site(SiteArgs),

    /// Delete the current user's session
    ClearSession,
}

/// Site directory subcommands.
#[derive(Args, Debug)]
pub struct SiteArgs {
    #[command(subcommand)]
    pub command: SiteCommand,
}

/// Operations on the reference site directory.
#[derive(Subcommand, Debug)]
pub enum SiteCommand {
    /// Register a site (or update its display name)
    Add {
        /// Site identifier, e.g. maos_ep
        id: String,
        /// Human-readable name
        name: String,
    },
    /// List registered sites
    List,
}
