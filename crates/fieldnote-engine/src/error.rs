//! Engine error types

use fieldnote_dates::WindowError;
use thiserror::Error;

/// Errors that can occur during engine operations.
///
/// `Validation` is the user's fault and carries a corrective hint verbatim;
/// everything else is an infrastructure failure. Not-found results are not
/// errors at all, they come back as ordinary report text.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Bad input: missing/unknown site, content too short, unrecognized
    /// date or window expression.
    #[error("{0}")]
    Validation(String),

    /// Storage failure; the triggering write was not partially applied.
    #[error("Storage error: {0}")]
    Store(String),

    /// Export file I/O failure
    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),

    /// PDF rendering failure
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

impl EngineError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub(crate) fn store(err: impl std::fmt::Display) -> Self {
        EngineError::Store(err.to_string())
    }
}

impl From<WindowError> for EngineError {
    fn from(err: WindowError) -> Self {
        EngineError::Validation(err.to_string())
    }
}
