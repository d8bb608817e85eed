//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the engine and its
//! infrastructure. Implementations live in other crates
//! (fieldnote-store, fieldnote-dates).

use crate::note::{NoteDraft, NoteId, NoteRecord, NoteStatus};
use crate::session::SessionState;

/// Wall-clock capture in canonical display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    /// Canonical display date, e.g. "Monday, 04 August 2025".
    pub date: String,
    /// Time of day, e.g. "14:05:33".
    pub time: String,
}

/// Wall-clock provider.
///
/// Implemented by the infrastructure layer (fieldnote-dates); tests
/// substitute a fixed clock.
pub trait Clock {
    /// Current date and time in canonical display form.
    fn now(&self) -> Timestamp;
}

/// Query criteria for retrieving notes.
#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    /// Filter by lowercase site identifier.
    pub site_id: Option<String>,

    /// Filter by exact canonical created-date key.
    pub created_date: Option<String>,

    /// Filter by status.
    pub status: Option<NoteStatus>,

    /// List newest rows first instead of date/time ascending.
    pub newest_first: bool,
}

impl NoteQuery {
    /// All notes for one site, date/time ascending.
    pub fn for_site(site_id: &str) -> Self {
        Self {
            site_id: Some(site_id.to_lowercase()),
            ..Self::default()
        }
    }

    /// All notes for one canonical date, date/time ascending.
    pub fn for_date(created_date: &str) -> Self {
        Self {
            created_date: Some(created_date.to_string()),
            ..Self::default()
        }
    }
}

/// Trait for storing and retrieving note records.
///
/// Multi-row writes (`insert_notes`, `resolve_notes`) must each be one
/// atomic transaction so a concurrent reader never observes a partial batch.
pub trait NoteStore {
    /// Error type for store operations.
    type Error;

    /// Persist a batch of drafts, assigning identities. One transaction.
    fn insert_notes(&mut self, drafts: Vec<NoteDraft>) -> Result<Vec<NoteRecord>, Self::Error>;

    /// Retrieve notes matching the query.
    fn query_notes(&self, query: &NoteQuery) -> Result<Vec<NoteRecord>, Self::Error>;

    /// All open notes for a site (reconciliation candidate set).
    fn open_notes(&self, site_id: &str) -> Result<Vec<NoteRecord>, Self::Error>;

    /// Mark the given notes resolved with one shared resolution date.
    /// One transaction; returns the number of rows updated.
    fn resolve_notes(&mut self, ids: &[NoteId], resolved_date: &str) -> Result<usize, Self::Error>;
}

/// Read-only membership lookup against the reference site directory.
pub trait SiteDirectory {
    /// Error type for directory operations.
    type Error;

    /// Whether the lowercase identifier names a registered site.
    fn site_exists(&self, site_id: &str) -> Result<bool, Self::Error>;
}

/// Persistence for session snapshots.
pub trait SessionStore {
    /// Error type for session operations.
    type Error;

    /// Load the snapshot for a user, if one exists.
    fn load_session(&self, user_id: &str) -> Result<Option<SessionState>, Self::Error>;

    /// Upsert the snapshot for a user.
    fn save_session(&mut self, user_id: &str, state: &SessionState) -> Result<(), Self::Error>;

    /// Remove a user's snapshot (explicit session deletion).
    fn delete_session(&mut self, user_id: &str) -> Result<(), Self::Error>;
}
