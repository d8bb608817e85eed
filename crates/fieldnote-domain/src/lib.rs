//! Fieldnote Domain Layer
//!
//! Core data model for the field-note extraction and reconciliation engine.
//! Everything revolves around the **note record**: one site-attributed,
//! timestamped description of a maintenance issue with an open/resolved
//! status.
//!
//! ## Key Concepts
//!
//! - **NoteDraft**: a candidate record produced by capture or document
//!   parsing, not yet persisted and therefore identity-free
//! - **NoteRecord**: a persisted note with a `NoteId` assigned by the store
//! - **SessionState**: per-user transient context (active site, pending
//!   notes, last export path)
//!
//! ## Architecture
//!
//! This crate holds pure business logic and the trait seams everything else
//! plugs into. Infrastructure (SQLite, wall clock, parsers) lives in the
//! other workspace crates and implements the traits in [`traits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod note;
pub mod session;
pub mod traits;

// Re-exports for convenience
pub use note::{valid_content, NoteDraft, NoteId, NoteRecord, NoteStatus, Provenance};
pub use session::SessionState;
pub use traits::{Clock, NoteQuery, NoteStore, SessionStore, SiteDirectory, Timestamp};
