//! Conversational capture flow
//!
//! Free-text notes arrive one chat turn at a time. Each turn is split into
//! candidate lines, filtered, persisted immediately, and appended to the
//! session buffer. Persistence is eager: the buffer exists for re-display
//! and export, never as the only copy.

use crate::engine::{Backend, Engine};
use crate::error::EngineError;
use fieldnote_domain::{valid_content, NoteDraft};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Tokens that end a capture turn without adding content.
const TERMINATORS: [&str; 4] = ["done", "enough", "selesai", "cukup"];

/// Words that mark a captured line as already handled.
const COMPLETION_WORDS: [&str; 6] = ["selesai", "sudah", "teratasi", "done", "resolved", "fixed"];

static SITE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bsite\s+([a-z0-9_\-]+)").unwrap());

static SITE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^site\s+([a-z0-9_\-]+)\s*$").unwrap());

static SITE_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^site\s+[a-z0-9_\-]+[:\s]*$").unwrap());

static LEADING_SITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*site\s+[a-z0-9_\-]+[:\s]*").unwrap());

static TRAILING_SITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsite\s+[a-z0-9_\-]+[:\s]*$").unwrap());

/// Extract the site token following the word "site", lowercased.
pub fn extract_site(text: &str) -> Option<String> {
    SITE_REF
        .captures(&text.to_lowercase())
        .map(|caps| caps[1].to_string())
}

impl<S: Backend> Engine<S> {
    /// Capture free-text notes for a user.
    ///
    /// Returns a user-facing status message. Validation problems (missing
    /// or unknown site, nothing valid to record) come back as
    /// [`EngineError::Validation`] with a corrective hint.
    pub fn capture(&self, text: &str, user_id: &str) -> Result<String, EngineError> {
        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();

        // A bare terminator ends the turn: an empty batch, not an error.
        if TERMINATORS.contains(&lower.as_str()) {
            debug!(user_id, "capture turn terminated with no new content");
            return Ok("📝 Capture finished for this turn; no new notes recorded.".to_string());
        }

        let mut store = self.lock_store();

        // A bare "site X" message only pins the active site.
        if let Some(caps) = SITE_ONLY.captures(&lower) {
            let site = caps[1].to_string();
            if !store.site_exists(&site).map_err(EngineError::store)? {
                return Err(EngineError::validation(format!(
                    "⚠ Site {site} is not in the site directory."
                )));
            }
            let mut session = self.sessions.get(&*store, user_id);
            session.active_site = Some(site.clone());
            self.sessions.put(&mut *store, user_id, session);
            return Ok(format!(
                "📌 Site {} pinned. Send notes as: 'site {site} <description>'.",
                site.to_uppercase()
            ));
        }

        let site = extract_site(trimmed).ok_or_else(|| {
            EngineError::validation(
                "⚠ Please include a site name in the note. \
                 Example: 'site MAOS_EP generator down'.",
            )
        })?;
        if !store.site_exists(&site).map_err(EngineError::store)? {
            return Err(EngineError::validation(format!(
                "⚠ Site {site} is not in the site directory."
            )));
        }

        let ts = self.now();
        let mut drafts = Vec::new();
        for raw in trimmed.split(|c| matches!(c, '.' | ',' | '\n')) {
            if let Some(draft) = self.clean_line(raw, &site, &ts.date, &ts.time) {
                drafts.push(draft);
            }
        }

        if drafts.is_empty() {
            return Err(EngineError::validation(
                "⚠ Note is too short or invalid. \
                 Include a clear description of at least 6 characters.",
            ));
        }

        let records = store.insert_notes(drafts).map_err(EngineError::store)?;
        let count = records.len();

        let mut session = self.sessions.get(&*store, user_id);
        session.active_site = Some(site.clone());
        session.pending_notes.extend(records);
        self.sessions.put(&mut *store, user_id, session);

        info!(user_id, %site, count, "notes captured");
        Ok(format!(
            "📝 {count} notes for site {} recorded and saved.",
            site.to_uppercase()
        ))
    }

    /// Clean one candidate line; `None` when it carries nothing recordable.
    fn clean_line(&self, raw: &str, site: &str, date: &str, time: &str) -> Option<NoteDraft> {
        let clean = raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '.' | ','));
        let lower = clean.to_lowercase();
        if clean.is_empty() || SITE_FRAGMENT.is_match(&lower) {
            return None;
        }

        // Drop embedded "site X" fragments from the line itself.
        let clean = LEADING_SITE.replace(clean, "");
        let clean = TRAILING_SITE.replace(&clean, "");
        let clean = clean.trim();
        let lower = clean.to_lowercase();

        if !valid_content(clean) {
            return None;
        }
        if self.config.ignore_phrases.iter().any(|p| lower.contains(p.as_str())) {
            debug!(line = clean, "audit-in-progress placeholder ignored");
            return None;
        }

        Some(if mentions_completion(&lower) {
            NoteDraft::resolved(site, clean, date, time, date)
        } else {
            NoteDraft::open(site, clean, date, time)
        })
    }
}

/// Whether a line's wording indicates completion.
pub(crate) fn mentions_completion(text: &str) -> bool {
    let lower = text.to_lowercase();
    COMPLETION_WORDS.iter().any(|w| lower.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_site() {
        assert_eq!(extract_site("site MAOS_EP genset turun"), Some("maos_ep".to_string()));
        assert_eq!(extract_site("catat site cilacap-pl antena"), Some("cilacap-pl".to_string()));
        assert_eq!(extract_site("genset turun lagi"), None);
    }

    #[test]
    fn test_terminator_list_is_exact_match_only() {
        // "done" alone terminates; "work is done" is content.
        assert!(TERMINATORS.contains(&"done"));
        assert!(mentions_completion("work is done"));
    }
}
