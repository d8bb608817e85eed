//! Status reconciliation
//!
//! Matches a free-text "this is fixed now" statement against the open notes
//! of one site and closes everything that qualifies, in one transaction.
//! Matching is a dual threshold: token-set similarity at or above the
//! configured minimum AND at least the configured number of shared tokens.
//! Similarity alone false-positives on generic short phrases.

use crate::capture::extract_site;
use crate::engine::{Backend, Engine};
use crate::error::EngineError;
use crate::similarity::{shared_token_count, token_set_ratio};
use tracing::{debug, info};

/// Words that indicate the statement claims completion.
const COMPLETION_TRIGGERS: [&str; 13] = [
    "sudah",
    "telah",
    "teratasi",
    "selesai",
    "diperbaiki",
    "diselesaikan",
    "beres",
    "clear",
    "aman",
    "already",
    "done",
    "resolved",
    "fixed",
];

impl<S: Backend> Engine<S> {
    /// Close open notes matching a resolution statement.
    ///
    /// Three distinct outcomes, all success-shaped: no completion
    /// indication in the statement, no matching note, or N notes closed.
    pub fn resolve(&self, text: &str) -> Result<String, EngineError> {
        let site = extract_site(text).ok_or_else(|| {
            EngineError::validation("⚠ No site name found in the statement.")
        })?;

        let lower = text.to_lowercase();
        if !COMPLETION_TRIGGERS.iter().any(|w| lower.contains(w)) {
            return Ok("⚠ No completion indication found; nothing updated.".to_string());
        }

        let mut store = self.lock_store();
        if !store.site_exists(&site).map_err(EngineError::store)? {
            return Err(EngineError::validation(format!(
                "⚠ Site {site} is not in the site directory."
            )));
        }

        let candidates = store.open_notes(&site).map_err(EngineError::store)?;
        let mut matched = Vec::new();
        for candidate in &candidates {
            let score = token_set_ratio(&lower, &candidate.content);
            let overlap = shared_token_count(&lower, &candidate.content);
            debug!(
                note = %candidate.id,
                score,
                overlap,
                "reconciliation candidate scored"
            );
            if score >= self.config.similarity_threshold
                && overlap >= self.config.min_shared_tokens
            {
                matched.push(candidate.id);
            }
        }

        if matched.is_empty() {
            return Ok(format!(
                "ℹ No matching open note for site {}.",
                site.to_uppercase()
            ));
        }

        let ts = self.now();
        let closed = store
            .resolve_notes(&matched, &ts.date)
            .map_err(EngineError::store)?;
        info!(%site, closed, "notes reconciled as resolved");
        Ok(format!(
            "✅ {closed} notes for site {} marked resolved.",
            site.to_uppercase()
        ))
    }
}
