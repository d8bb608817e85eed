//! Document ingestion
//!
//! Runs the parser cascade over plain text extracted from an uploaded
//! document and persists whatever it recognizes. Text extraction itself
//! (OCR, PDF, DOCX) is an external collaborator; this path only consumes
//! the resulting text.

use crate::engine::{Backend, Engine};
use crate::error::EngineError;
use fieldnote_domain::Provenance;
use fieldnote_extractor::{parse_document, DocumentContext};
use tracing::info;

impl<S: Backend> Engine<S> {
    /// Parse a document's text for a site and persist the recognized notes.
    pub fn ingest(
        &self,
        text: &str,
        site_id: &str,
        provenance: Option<Provenance>,
        user_id: &str,
    ) -> Result<String, EngineError> {
        let site = site_id.to_lowercase();
        let mut store = self.lock_store();
        if !store.site_exists(&site).map_err(EngineError::store)? {
            return Err(EngineError::validation(format!(
                "⚠ Site {site} is not in the site directory."
            )));
        }

        let ts = self.now();
        let mut ctx = DocumentContext::new(&site, &ts.date, &ts.time);
        if let Some(provenance) = provenance {
            ctx = ctx.with_provenance(provenance);
        }

        let drafts = parse_document(text, &ctx);
        if drafts.is_empty() {
            return Err(EngineError::validation(
                "⚠ No notes recognized in the document.",
            ));
        }

        let records = store.insert_notes(drafts).map_err(EngineError::store)?;
        let count = records.len();

        let mut session = self.sessions.get(&*store, user_id);
        session.active_site = Some(site.clone());
        session.pending_notes.extend(records);
        self.sessions.put(&mut *store, user_id, session);

        info!(user_id, %site, count, "document ingested");
        Ok(format!(
            "📝 {count} notes for site {} ingested from document.",
            site.to_uppercase()
        ))
    }
}
