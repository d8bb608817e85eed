//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine operation failure
    #[error(transparent)]
    Engine(#[from] fieldnote_engine::EngineError),

    /// Storage failure
    #[error("Storage error: {0}")]
    Store(#[from] fieldnote_store::StoreError),

    /// Admission scheduler failure
    #[error(transparent)]
    Scheduler(#[from] fieldnote_scheduler::SchedulerError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
