//! Merge viewer
//!
//! Read-back of note history, filtered by site and/or date, or merged with
//! the caller's session for "show mine". Both sources are always
//! represented; duplicates by content are kept (temporal accumulation, not
//! deduplication). Records persisted eagerly by capture appear on the
//! database side, so the session supplements only rows not yet flushed.

use crate::engine::{Backend, Engine};
use crate::error::EngineError;
use crate::render;
use chrono::NaiveDate;
use fieldnote_dates::{normalize, parse_day_first};
use fieldnote_domain::{NoteQuery, NoteRecord};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static SITE_AND_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"site\s+([a-z0-9_\-]+).*?(?:tanggal|date)\s+([\w\s,/\-.]+)").unwrap()
});

static DATE_FILTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:tanggal|date)\s+([\w\s,/\-.]+)").unwrap());

static SITE_FILTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"site\s+([a-z0-9_\-]+)").unwrap());

/// Which of the four mutually exclusive query modes a request selects.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ViewMode {
    SiteAndDate { site: String, date: String },
    Site { site: String },
    Date { date: String },
    Mine,
}

fn view_mode(text: &str) -> ViewMode {
    let lower = text.to_lowercase();
    if let Some(caps) = SITE_AND_DATE.captures(&lower) {
        return ViewMode::SiteAndDate {
            site: caps[1].to_string(),
            date: caps[2].trim().to_string(),
        };
    }
    if let Some(caps) = SITE_FILTER.captures(&lower) {
        return ViewMode::Site {
            site: caps[1].to_string(),
        };
    }
    if let Some(caps) = DATE_FILTER.captures(&lower) {
        return ViewMode::Date {
            date: caps[1].trim().to_string(),
        };
    }
    ViewMode::Mine
}

impl<S: Backend> Engine<S> {
    /// Show notes for a site and/or date, or the caller's merged session
    /// view when neither filter is present.
    pub fn show(&self, text: &str, user_id: &str) -> Result<String, EngineError> {
        match view_mode(text) {
            ViewMode::SiteAndDate { site, date } => self.show_filtered(Some(site), Some(date)),
            ViewMode::Site { site } => self.show_filtered(Some(site), None),
            ViewMode::Date { date } => self.show_filtered(None, Some(date)),
            ViewMode::Mine => self.show_mine(user_id),
        }
    }

    fn show_filtered(
        &self,
        site: Option<String>,
        date_input: Option<String>,
    ) -> Result<String, EngineError> {
        let today = self.today();
        let date_key = date_input
            .as_deref()
            .map(|d| normalize(d, today).display_key());

        let query = NoteQuery {
            site_id: site.clone(),
            created_date: date_key,
            ..NoteQuery::default()
        };

        let store = self.lock_store();
        let mut records = store.query_notes(&query).map_err(EngineError::store)?;
        drop(store);
        sort_chronological(&mut records, today);

        if records.is_empty() {
            return Ok(match (&site, &date_input) {
                (Some(s), Some(d)) => {
                    format!("📭 No notes found for site {} on {d}.", s.to_uppercase())
                }
                (Some(s), None) => format!("📭 No notes found for site {}.", s.to_uppercase()),
                (None, Some(d)) => format!("📭 No notes found for {d}."),
                (None, None) => "📭 No notes found.".to_string(),
            });
        }

        let header = match (&site, &date_input) {
            (Some(s), Some(d)) => format!("📑 Site {} notes for {d}:", s.to_uppercase()),
            (Some(s), None) => format!("📑 Site {} notes:", s.to_uppercase()),
            _ => format!(
                "🗓 Notes for {}:",
                date_input.as_deref().unwrap_or_default()
            ),
        };

        let mut out = vec![header];
        let tag_site = site.is_none();
        for record in &records {
            out.push(render::entry(record, tag_site));
        }
        Ok(out.join("\n\n"))
    }

    /// Merge the session's active site's persisted rows with its buffered
    /// rows, re-deriving the buffer from the merge result. A second call
    /// with no intervening capture is a fixed point.
    fn show_mine(&self, user_id: &str) -> Result<String, EngineError> {
        let mut store = self.lock_store();
        let mut session = self.sessions.get(&*store, user_id);

        let site = session.active_site.clone().ok_or_else(|| {
            EngineError::validation(
                "⚠ Request not recognized. Use:\n\
                 - show notes site <name>\n\
                 - show notes date <date>\n\
                 - show notes site <name> date <date>\n\
                 - show my notes (session + database)",
            )
        })?;

        // Database rows first, newest capture batch on top.
        let query = NoteQuery {
            site_id: Some(site.clone()),
            newest_first: true,
            ..NoteQuery::default()
        };
        let db_records = store.query_notes(&query).map_err(EngineError::store)?;
        let db_ids: HashSet<_> = db_records.iter().map(|r| r.id).collect();

        let mut merged: Vec<NoteRecord> = Vec::new();
        for record in &db_records {
            merged.extend(render::explode(record));
        }
        // Session rows not yet visible in the database follow.
        for record in &session.pending_notes {
            if !db_ids.contains(&record.id) {
                debug!(note = %record.id, "session-only record supplements database view");
                merged.extend(render::explode(record));
            }
        }

        if merged.is_empty() {
            return Ok(format!(
                "📭 No notes found for site {}.",
                site.to_uppercase()
            ));
        }

        let mut out = vec![format!(
            "📑 Site {} notes (session + database):",
            site.to_uppercase()
        )];
        for record in &merged {
            out.push(render::entry(record, false));
        }

        // Re-derive the buffer so the next show reflects database state.
        session.pending_notes = merged;
        session.active_site = Some(site);
        self.sessions.put(&mut *store, user_id, session);

        Ok(out.join("\n\n"))
    }
}

/// Order by real calendar date, then time of day. Stored date keys are
/// display strings; unparsable ones sort first rather than failing.
pub(crate) fn sort_chronological(records: &mut [NoteRecord], today: NaiveDate) {
    records.sort_by_key(|r| {
        (
            parse_day_first(&r.created_date, today).unwrap_or(NaiveDate::MIN),
            r.created_time.clone(),
        )
    });
}
