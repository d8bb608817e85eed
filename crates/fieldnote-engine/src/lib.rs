//! Fieldnote Engine
//!
//! The field-note engine: eager-persist conversational capture, fuzzy
//! status reconciliation, merged read-back, time-windowed recaps, and file
//! export, all over a pluggable storage [`Backend`].
//!
//! Operations are synchronous; the admission scheduler upstream guarantees
//! only one runs at a time. Every user-facing outcome is a plain message
//! string: validation problems come back as
//! [`EngineError::Validation`](error::EngineError::Validation) with a
//! corrective hint, while not-found results are success-shaped report text.
//!
//! # Examples
//!
//! ```no_run
//! use fieldnote_engine::Engine;
//! use fieldnote_store::SqliteStore;
//! use fieldnote_dates::SystemClock;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("notes.db")?;
//! let engine = Engine::new(store, Box::new(SystemClock));
//! let message = engine.capture("site MAOS_EP genset turun lagi", "tech-1")?;
//! println!("{message}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
mod ingest;
mod recap;
mod reconcile;
mod render;
pub mod session;
pub mod similarity;
mod view;

pub use config::EngineConfig;
pub use engine::{Backend, Engine};
pub use error::EngineError;
pub use export::ExportFormat;
pub use session::SessionTracker;
