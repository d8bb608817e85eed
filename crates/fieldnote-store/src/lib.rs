//! Fieldnote Storage Layer
//!
//! SQLite-backed implementation of the domain storage traits: note records,
//! the reference site directory, and session snapshots.
//!
//! # Atomicity
//!
//! Multi-row writes (`insert_notes`, `resolve_notes`) each run inside one
//! transaction, so a concurrent reader never observes a partially written
//! capture batch or a partially resolved reconciliation.
//!
//! # Examples
//!
//! ```no_run
//! use fieldnote_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is ready for note operations
//! ```

#![warn(missing_docs)]

use fieldnote_domain::{
    NoteDraft, NoteId, NoteQuery, NoteRecord, NoteStatus, Provenance, SessionState,
};
use fieldnote_domain::traits::{NoteStore, SessionStore, SiteDirectory};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Session snapshot (de)serialization failure
    #[error("Session snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// SQLite-based store for notes, sites, and session snapshots.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe; callers share one store behind a
/// mutex (see the engine's coordinator).
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (and initialize) a store at the given path.
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(store)
    }

    /// Register a site in the reference directory.
    ///
    /// The engine itself never creates sites; this exists for directory
    /// maintenance tooling and tests.
    pub fn add_site(&mut self, site_id: &str, site_name: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO sites (site_id, site_name) VALUES (?1, ?2)
             ON CONFLICT(site_id) DO UPDATE SET site_name = excluded.site_name",
            params![site_id.to_lowercase(), site_name],
        )?;
        Ok(())
    }

    /// All registered sites as `(site_id, site_name)` pairs.
    pub fn list_sites(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT site_id, site_name FROM sites ORDER BY site_id")?;
        let sites = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    fn note_id_to_bytes(id: NoteId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn bytes_to_note_id(bytes: &[u8]) -> Result<NoteId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "expected 16 bytes for note id, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(NoteId::from_value(u128::from_be_bytes(arr)))
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<NoteRecord> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_note_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;

        let status: String = row.get(3)?;
        let file_path: Option<String> = row.get(7)?;
        let original_filename: Option<String> = row.get(8)?;
        let custom_name: Option<String> = row.get(9)?;
        let file_type: Option<String> = row.get(10)?;
        let provenance = file_path.map(|path| Provenance {
            file_path: path,
            original_filename: original_filename.unwrap_or_default(),
            custom_name,
            file_type,
        });

        Ok(NoteRecord {
            id,
            site_id: row.get(1)?,
            content: row.get(2)?,
            status: NoteStatus::parse(&status),
            created_date: row.get(4)?,
            created_time: row.get(5)?,
            resolved_date: row.get(6)?,
            provenance,
        })
    }
}

const SELECT_COLUMNS: &str = "id, site_id, content, status, created_date, created_time, \
     resolved_date, file_path, original_filename, custom_name, file_type";

impl NoteStore for SqliteStore {
    type Error = StoreError;

    fn insert_notes(&mut self, drafts: Vec<NoteDraft>) -> Result<Vec<NoteRecord>, Self::Error> {
        for draft in &drafts {
            draft
                .validate()
                .map_err(StoreError::InvalidData)?;
        }

        let tx = self.conn.transaction()?;
        let mut records = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = NoteId::new();
            let provenance = draft.provenance.clone();
            tx.execute(
                "INSERT INTO notes (id, site_id, content, status, created_date, created_time, \
                 resolved_date, file_path, original_filename, custom_name, file_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    Self::note_id_to_bytes(id),
                    &draft.site_id,
                    &draft.content,
                    draft.status.as_str(),
                    &draft.created_date,
                    &draft.created_time,
                    &draft.resolved_date,
                    provenance.as_ref().map(|p| &p.file_path),
                    provenance.as_ref().map(|p| &p.original_filename),
                    provenance.as_ref().and_then(|p| p.custom_name.as_ref()),
                    provenance.as_ref().and_then(|p| p.file_type.as_ref()),
                ],
            )?;
            records.push(NoteRecord::from_draft(id, draft));
        }
        tx.commit()?;
        Ok(records)
    }

    fn query_notes(&self, query: &NoteQuery) -> Result<Vec<NoteRecord>, Self::Error> {
        let mut sql = format!("SELECT {} FROM notes WHERE content <> ''", SELECT_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(site_id) = &query.site_id {
            sql.push_str(" AND site_id = ?");
            params.push(Box::new(site_id.to_lowercase()));
        }
        if let Some(date) = &query.created_date {
            sql.push_str(" AND created_date = ?");
            params.push(Box::new(date.clone()));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.as_str()));
        }
        if query.newest_first {
            // UUIDv7 ids sort chronologically
            sql.push_str(" ORDER BY id DESC");
        } else {
            sql.push_str(" ORDER BY created_date, created_time, id");
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let records = stmt
            .query_map(&param_refs[..], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn open_notes(&self, site_id: &str) -> Result<Vec<NoteRecord>, Self::Error> {
        // Anything not explicitly resolved is a candidate; rows written by
        // earlier tooling may carry the legacy 'selesai' spelling.
        let sql = format!(
            "SELECT {} FROM notes
             WHERE site_id = ?1 AND content <> ''
               AND status NOT IN ('resolved', 'selesai')
             ORDER BY created_date, created_time, id",
            SELECT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![site_id.to_lowercase()], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn resolve_notes(&mut self, ids: &[NoteId], resolved_date: &str) -> Result<usize, Self::Error> {
        let tx = self.conn.transaction()?;
        let mut updated = 0;
        for id in ids {
            updated += tx.execute(
                "UPDATE notes SET status = 'resolved', resolved_date = ?1
                 WHERE id = ?2 AND status NOT IN ('resolved', 'selesai')",
                params![resolved_date, Self::note_id_to_bytes(*id)],
            )?;
        }
        tx.commit()?;
        Ok(updated)
    }
}

impl SiteDirectory for SqliteStore {
    type Error = StoreError;

    fn site_exists(&self, site_id: &str) -> Result<bool, Self::Error> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM sites WHERE site_id = ?1",
                params![site_id.to_lowercase()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl SessionStore for SqliteStore {
    type Error = StoreError;

    fn load_session(&self, user_id: &str) -> Result<Option<SessionState>, Self::Error> {
        let row = self
            .conn
            .query_row(
                "SELECT active_site, pending_notes, last_export_path
                 FROM sessions WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((active_site, pending_json, last_export_path)) => {
                let pending_notes = serde_json::from_str(&pending_json)?;
                Ok(Some(SessionState {
                    active_site,
                    pending_notes,
                    last_export_path,
                }))
            }
        }
    }

    fn save_session(&mut self, user_id: &str, state: &SessionState) -> Result<(), Self::Error> {
        let pending_json = serde_json::to_string(&state.pending_notes)?;
        self.conn.execute(
            "INSERT INTO sessions (user_id, active_site, pending_notes, last_export_path)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                 active_site = excluded.active_site,
                 pending_notes = excluded.pending_notes,
                 last_export_path = excluded.last_export_path",
            params![
                user_id,
                &state.active_site,
                pending_json,
                &state.last_export_path
            ],
        )?;
        Ok(())
    }

    fn delete_session(&mut self, user_id: &str) -> Result<(), Self::Error> {
        self.conn
            .execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_site() -> SqliteStore {
        let mut store = SqliteStore::new(":memory:").unwrap();
        store.add_site("maos_ep", "MAOS EP").unwrap();
        store
    }

    fn draft(content: &str) -> NoteDraft {
        NoteDraft::open("maos_ep", content, "Monday, 04 August 2025", "09:00:00")
    }

    #[test]
    fn test_insert_assigns_ids_and_roundtrips() {
        let mut store = store_with_site();
        let records = store
            .insert_notes(vec![draft("genset turun lagi"), draft("antena miring ke barat")])
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].id, records[1].id);

        let fetched = store.query_notes(&NoteQuery::for_site("MAOS_EP")).unwrap();
        assert_eq!(fetched, records);
    }

    #[test]
    fn test_insert_rejects_invalid_draft() {
        let mut store = store_with_site();
        let mut bad = draft("genset turun lagi");
        bad.resolved_date = Some("Tuesday".to_string()); // open + resolved_date
        let result = store.insert_notes(vec![bad]);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
        // Nothing was written
        assert!(store.query_notes(&NoteQuery::for_site("maos_ep")).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_notes_is_batched_and_stamps_date() {
        let mut store = store_with_site();
        let records = store
            .insert_notes(vec![draft("genset turun lagi"), draft("antena miring ke barat")])
            .unwrap();
        let ids: Vec<NoteId> = records.iter().map(|r| r.id).collect();

        let updated = store.resolve_notes(&ids, "Wednesday, 06 August 2025").unwrap();
        assert_eq!(updated, 2);

        for record in store.query_notes(&NoteQuery::for_site("maos_ep")).unwrap() {
            assert_eq!(record.status, NoteStatus::Resolved);
            assert_eq!(record.resolved_date.as_deref(), Some("Wednesday, 06 August 2025"));
        }

        // Resolving again touches nothing
        assert_eq!(store.resolve_notes(&ids, "later").unwrap(), 0);
    }

    #[test]
    fn test_open_notes_filters_status() {
        let mut store = store_with_site();
        let records = store
            .insert_notes(vec![draft("genset turun lagi"), draft("antena miring ke barat")])
            .unwrap();
        store
            .resolve_notes(&[records[0].id], "Wednesday, 06 August 2025")
            .unwrap();

        let open = store.open_notes("maos_ep").unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].content, "antena miring ke barat");
    }

    #[test]
    fn test_query_by_date() {
        let mut store = store_with_site();
        let mut other_day = draft("shelter bocor saat hujan");
        other_day.created_date = "Tuesday, 05 August 2025".to_string();
        store
            .insert_notes(vec![draft("genset turun lagi"), other_day])
            .unwrap();

        let rows = store
            .query_notes(&NoteQuery::for_date("Tuesday, 05 August 2025"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "shelter bocor saat hujan");
    }

    #[test]
    fn test_site_directory_membership() {
        let store = store_with_site();
        assert!(store.site_exists("maos_ep").unwrap());
        assert!(store.site_exists("MAOS_EP").unwrap());
        assert!(!store.site_exists("zzz_unknown").unwrap());
    }

    #[test]
    fn test_session_snapshot_roundtrip() {
        let mut store = store_with_site();
        assert!(store.load_session("tech-1").unwrap().is_none());

        let records = store.insert_notes(vec![draft("genset turun lagi")]).unwrap();
        let state = SessionState {
            active_site: Some("maos_ep".to_string()),
            pending_notes: records,
            last_export_path: Some("/tmp/MAOS_EP_20250804.txt".to_string()),
        };
        store.save_session("tech-1", &state).unwrap();
        assert_eq!(store.load_session("tech-1").unwrap(), Some(state.clone()));

        // Upsert replaces
        let cleared = SessionState::with_site("cilacap_pl");
        store.save_session("tech-1", &cleared).unwrap();
        assert_eq!(store.load_session("tech-1").unwrap(), Some(cleared));

        store.delete_session("tech-1").unwrap();
        assert!(store.load_session("tech-1").unwrap().is_none());
    }

    #[test]
    fn test_provenance_roundtrip() {
        let mut store = store_with_site();
        let d = draft("hasil audit dokumen site").with_provenance(Provenance {
            file_path: "uploads/maos_ep.txt".to_string(),
            original_filename: "audit.txt".to_string(),
            custom_name: Some("laporan audit".to_string()),
            file_type: Some("txt".to_string()),
        });
        store.insert_notes(vec![d]).unwrap();

        let rows = store.query_notes(&NoteQuery::for_site("maos_ep")).unwrap();
        let p = rows[0].provenance.as_ref().unwrap();
        assert_eq!(p.original_filename, "audit.txt");
        assert_eq!(p.file_type.as_deref(), Some("txt"));
    }
}
