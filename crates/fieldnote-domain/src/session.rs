//! Per-user session state

use crate::note::NoteRecord;
use serde::{Deserialize, Serialize};

/// Transient per-user context carried across conversational turns.
///
/// The in-memory copy is authoritative within a process lifetime; a
/// persisted snapshot mirrors it opportunistically so state survives
/// restarts. Readers must tolerate a cache miss by falling back to storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Last site the user referenced; sticky across turns.
    pub active_site: Option<String>,

    /// Ordered, not-yet-superseded note records from recent captures or the
    /// last merged display. Every record here is already persisted (writes
    /// are eager); the buffer exists for re-display and export.
    pub pending_notes: Vec<NoteRecord>,

    /// Path of the most recent export, if any.
    pub last_export_path: Option<String>,
}

impl SessionState {
    /// Session with only the active site set.
    pub fn with_site(site_id: &str) -> Self {
        Self {
            active_site: Some(site_id.to_lowercase()),
            ..Self::default()
        }
    }

    /// True when there is nothing to display or export.
    pub fn is_empty(&self) -> bool {
        self.pending_notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_site_normalizes_case() {
        let session = SessionState::with_site("CILACAP_PL");
        assert_eq!(session.active_site.as_deref(), Some("cilacap_pl"));
        assert!(session.is_empty());
    }
}
