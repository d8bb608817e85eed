//! Note records - the durable unit of the engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum content length for a valid note (strictly greater than this).
pub const MIN_CONTENT_LEN: usize = 5;

/// Unique identifier for a persisted note, backed by UUIDv7.
///
/// UUIDv7 keeps identifiers chronologically sortable, which is what the
/// merge viewer relies on when listing database rows newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoteId(u128);

impl NoteId {
    /// Generate a fresh UUIDv7-based identifier.
    ///
    /// Called by the store at persistence time; drafts never carry an id.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Reconstruct an id from its raw value (storage deserialization).
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Raw u128 value, for storage serialization.
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl FromStr for NoteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("invalid note id '{}': {}", s, e))
    }
}

/// Lifecycle status of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    /// Issue is outstanding.
    Open,
    /// Issue has been resolved; `resolved_date` must be set.
    Resolved,
}

impl NoteStatus {
    /// Canonical storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Open => "open",
            NoteStatus::Resolved => "resolved",
        }
    }

    /// Parse a status string, accepting the legacy Indonesian spellings
    /// found in uploaded documents and older rows.
    pub fn parse(s: &str) -> NoteStatus {
        let lc = s.trim().to_lowercase();
        if lc.contains("selesai") || lc.contains("resolved") || lc.contains("done") {
            NoteStatus::Resolved
        } else {
            NoteStatus::Open
        }
    }

    /// Glyph used in all rendered output.
    pub fn glyph(&self) -> &'static str {
        match self {
            NoteStatus::Open => "⏳",
            NoteStatus::Resolved => "✅",
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload provenance, set only for notes that originated from a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Provenance {
    /// Path the file was stored under.
    pub file_path: String,

    /// Filename as supplied by the uploader.
    pub original_filename: String,

    /// Optional user-supplied display label.
    pub custom_name: Option<String>,

    /// File extension without the dot ("txt", "pdf", ...).
    pub file_type: Option<String>,
}

/// A candidate note that has not been persisted yet.
///
/// Drafts are produced by the capture flow and the parser cascade; the
/// store assigns a [`NoteId`] when it accepts one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    /// Lowercase site identifier, validated against the site directory.
    pub site_id: String,

    /// Trimmed free text describing one discrete issue.
    pub content: String,

    /// Open or resolved.
    pub status: NoteStatus,

    /// Canonical display date the note was captured.
    pub created_date: String,

    /// Wall-clock time the note was captured.
    pub created_time: String,

    /// Present iff `status == Resolved`.
    pub resolved_date: Option<String>,

    /// Set only for document-sourced notes.
    pub provenance: Option<Provenance>,
}

impl NoteDraft {
    /// Create an open draft.
    pub fn open(site_id: &str, content: &str, created_date: &str, created_time: &str) -> Self {
        Self {
            site_id: site_id.to_lowercase(),
            content: content.trim().to_string(),
            status: NoteStatus::Open,
            created_date: created_date.to_string(),
            created_time: created_time.to_string(),
            resolved_date: None,
            provenance: None,
        }
    }

    /// Create a resolved draft stamped with its resolution date.
    pub fn resolved(
        site_id: &str,
        content: &str,
        created_date: &str,
        created_time: &str,
        resolved_date: &str,
    ) -> Self {
        Self {
            site_id: site_id.to_lowercase(),
            content: content.trim().to_string(),
            status: NoteStatus::Resolved,
            created_date: created_date.to_string(),
            created_time: created_time.to_string(),
            resolved_date: Some(resolved_date.to_string()),
            provenance: None,
        }
    }

    /// Attach upload provenance.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// Validate the draft against the record model.
    ///
    /// Checks content shape (see [`valid_content`]) and the
    /// status/resolved-date coupling invariant.
    pub fn validate(&self) -> Result<(), String> {
        if self.site_id.is_empty() {
            return Err("site_id is empty".to_string());
        }
        if !valid_content(&self.content) {
            return Err(format!(
                "content too short or a single token: '{}'",
                self.content
            ));
        }
        match (self.status, &self.resolved_date) {
            (NoteStatus::Resolved, None) => {
                Err("resolved note is missing resolved_date".to_string())
            }
            (NoteStatus::Open, Some(_)) => {
                Err("open note must not carry resolved_date".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// A persisted note record.
///
/// Records are never updated except for the open → resolved transition,
/// which also sets `resolved_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Identity assigned by the store.
    pub id: NoteId,

    /// Lowercase site identifier.
    pub site_id: String,

    /// Free text describing one discrete issue.
    pub content: String,

    /// Open or resolved.
    pub status: NoteStatus,

    /// Canonical display date the note was captured.
    pub created_date: String,

    /// Wall-clock time the note was captured.
    pub created_time: String,

    /// Present iff `status == Resolved`.
    pub resolved_date: Option<String>,

    /// Set only for document-sourced notes.
    pub provenance: Option<Provenance>,
}

impl NoteRecord {
    /// Promote a draft to a record with the given identity.
    pub fn from_draft(id: NoteId, draft: NoteDraft) -> Self {
        Self {
            id,
            site_id: draft.site_id,
            content: draft.content,
            status: draft.status,
            created_date: draft.created_date,
            created_time: draft.created_time,
            resolved_date: draft.resolved_date,
            provenance: draft.provenance,
        }
    }
}

/// Content acceptance rule: more than [`MIN_CONTENT_LEN`] characters and at
/// least one interior space. Rejects bare tokens like "ok" or "genset".
pub fn valid_content(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.chars().count() > MIN_CONTENT_LEN && trimmed.contains(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_id_roundtrip() {
        let id = NoteId::new();
        let parsed: NoteId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_note_id_chronological() {
        let a = NoteId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = NoteId::new();
        assert!(a < b, "earlier UUIDv7 should sort before later one");
    }

    #[test]
    fn test_note_id_invalid_string() {
        assert!("not-a-uuid".parse::<NoteId>().is_err());
        assert!("".parse::<NoteId>().is_err());
    }

    #[test]
    fn test_status_parse_accepts_legacy_forms() {
        assert_eq!(NoteStatus::parse("selesai"), NoteStatus::Resolved);
        assert_eq!(NoteStatus::parse("Resolved"), NoteStatus::Resolved);
        assert_eq!(NoteStatus::parse("done"), NoteStatus::Resolved);
        assert_eq!(NoteStatus::parse("aktif"), NoteStatus::Open);
        assert_eq!(NoteStatus::parse("open"), NoteStatus::Open);
        assert_eq!(NoteStatus::parse(""), NoteStatus::Open);
    }

    #[test]
    fn test_valid_content_rules() {
        assert!(!valid_content("ok"));
        assert!(!valid_content("generator"), "single token rejected");
        assert!(!valid_content("a b"), "too short");
        assert!(valid_content("antenna is broken now"));
        assert!(valid_content("  genset turun  "));
    }

    #[test]
    fn test_draft_coupling_invariant() {
        let mut draft = NoteDraft::open("maos_ep", "genset turun lagi", "Monday, 04 August 2025", "08:00:00");
        assert!(draft.validate().is_ok());

        // resolved_date on an open note violates the coupling
        draft.resolved_date = Some("Tuesday, 05 August 2025".to_string());
        assert!(draft.validate().is_err());

        let resolved = NoteDraft::resolved(
            "maos_ep",
            "genset sudah diperbaiki",
            "Monday, 04 August 2025",
            "08:00:00",
            "Monday, 04 August 2025",
        );
        assert!(resolved.validate().is_ok());

        let mut broken = resolved;
        broken.resolved_date = None;
        assert!(broken.validate().is_err());
    }

    #[test]
    fn test_draft_lowercases_site() {
        let draft = NoteDraft::open("MAOS_EP", "genset turun lagi", "d", "t");
        assert_eq!(draft.site_id, "maos_ep");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: NoteId ordering matches the underlying u128 ordering.
        #[test]
        fn test_id_ordering(a: u128, b: u128) {
            let ia = NoteId::from_value(a);
            let ib = NoteId::from_value(b);
            prop_assert_eq!(ia < ib, a < b);
            prop_assert_eq!(ia == ib, a == b);
        }

        /// Property: valid content always survives a draft round-trip intact.
        #[test]
        fn test_valid_content_never_panics(s in "\\PC{0,64}") {
            let _ = valid_content(&s);
        }
    }
}
