//! Recap aggregation
//!
//! Computes a date window from a natural-language expression and summarizes
//! matching records per site: totals, resolved/open counters, and one
//! bullet per content line. Stored date keys that fail to parse are skipped
//! from the window filter (logged, not reported) since dates carry free-text
//! provenance.

use crate::engine::{Backend, Engine};
use crate::error::EngineError;
use crate::render;
use fieldnote_dates::{parse_day_first, resolve_window};
use fieldnote_domain::{NoteQuery, NoteRecord, NoteStatus, SessionState};
use tracing::{debug, info};

/// Per-site aggregation bucket.
struct SiteSummary {
    site_id: String,
    total: usize,
    resolved: usize,
    open: usize,
    entries: Vec<String>,
}

impl<S: Backend> Engine<S> {
    /// Summarize notes inside a natural-language date window, grouped by
    /// site in first-seen order.
    ///
    /// Side effect: the caller's session buffer is overwritten with the
    /// flattened result set under the sentinel site name, so a follow-up
    /// export operates on whatever was last shown.
    pub fn recap(&self, text: &str, user_id: &str) -> Result<String, EngineError> {
        let today = self.today();
        let window = resolve_window(text, today)?;

        let mut store = self.lock_store();
        let mut records = store
            .query_notes(&NoteQuery::default())
            .map_err(EngineError::store)?;
        if records.is_empty() {
            return Ok("📭 No notes found in the database.".to_string());
        }

        // First-seen grouping order follows the original's site-major sort.
        records.sort_by(|a, b| a.site_id.cmp(&b.site_id));

        let mut summaries: Vec<SiteSummary> = Vec::new();
        let mut flattened: Vec<NoteRecord> = Vec::new();

        for record in &records {
            let date = match parse_day_first(&record.created_date, today) {
                Some(date) => date,
                None => {
                    debug!(
                        note = %record.id,
                        date = %record.created_date,
                        "stored date key did not parse; skipped from window"
                    );
                    continue;
                }
            };
            if !window.contains(date) {
                continue;
            }

            let idx = match summaries.iter().position(|s| s.site_id == record.site_id) {
                Some(idx) => idx,
                None => {
                    summaries.push(SiteSummary {
                        site_id: record.site_id.clone(),
                        total: 0,
                        resolved: 0,
                        open: 0,
                        entries: Vec::new(),
                    });
                    summaries.len() - 1
                }
            };
            let summary = &mut summaries[idx];

            summary.total += 1;
            match record.status {
                NoteStatus::Resolved => summary.resolved += 1,
                NoteStatus::Open => summary.open += 1,
            }
            for point in render::explode(record) {
                summary.entries.push(render::entry(&point, false));
                flattened.push(point);
            }
        }

        if summaries.is_empty() {
            return Ok(format!("📭 No notes found for {}.", window.label()));
        }

        let mut out = vec![format!("📊 Recap ({}):", window.label())];
        for summary in &summaries {
            out.push(format!(
                "📍 {}\nTotal: {} | ✅ Resolved: {} | ⏳ Open: {}",
                summary.site_id.to_uppercase(),
                summary.total,
                summary.resolved,
                summary.open
            ));
            out.extend(summary.entries.iter().cloned());
        }

        info!(
            user_id,
            sites = summaries.len(),
            notes = flattened.len(),
            "recap computed"
        );

        // Overwrite the session with the shown set under the sentinel site.
        let session = SessionState {
            active_site: Some(self.config.recap_site.clone()),
            pending_notes: flattened,
            last_export_path: None,
        };
        self.sessions.put(&mut *store, user_id, session);

        Ok(out.join("\n\n"))
    }
}
