//! Cascade driver and shared draft assembly

use fieldnote_domain::{valid_content, NoteDraft, NoteStatus, Provenance};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Per-document parsing context: the target site, the timestamp to stamp on
/// records that carry no date of their own, and upload provenance.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    /// Lowercase target site (already validated by the caller).
    pub site_id: String,
    /// Capture date used when a record has no date marker.
    pub default_date: String,
    /// Capture time used when a record has no time marker.
    pub default_time: String,
    /// Upload provenance attached to every draft, if any.
    pub provenance: Option<Provenance>,
}

impl DocumentContext {
    /// Context without provenance.
    pub fn new(site_id: &str, default_date: &str, default_time: &str) -> Self {
        Self {
            site_id: site_id.to_lowercase(),
            default_date: default_date.to_string(),
            default_time: default_time.to_string(),
            provenance: None,
        }
    }

    /// Attach upload provenance.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
}

/// A recognizer strategy: all-or-nothing over the whole document.
/// `None` means "this format did not match at all".
type Strategy = fn(&str, &DocumentContext) -> Option<Vec<NoteDraft>>;

const STRATEGIES: [(&str, Strategy); 3] = [
    ("emoji", emoji_strategy),
    ("labeled", labeled_strategy),
    ("blocks", blocks_strategy),
];

fn emoji_strategy(text: &str, ctx: &DocumentContext) -> Option<Vec<NoteDraft>> {
    crate::emoji::parse(text, ctx)
}

fn labeled_strategy(text: &str, ctx: &DocumentContext) -> Option<Vec<NoteDraft>> {
    crate::labeled::parse(text, ctx)
}

fn blocks_strategy(text: &str, ctx: &DocumentContext) -> Option<Vec<NoteDraft>> {
    crate::blocks::parse(text, ctx)
}

/// Run the cascade over a document.
///
/// Returns the drafts of the first strategy that produced any; an empty
/// vector when no recognizer matched anything.
pub fn parse_document(text: &str, ctx: &DocumentContext) -> Vec<NoteDraft> {
    let text = clean_text(text);

    for (name, strategy) in STRATEGIES {
        if let Some(drafts) = strategy(&text, ctx) {
            debug!(strategy = name, count = drafts.len(), "cascade matched");
            return drafts;
        }
    }

    debug!("no cascade strategy matched the document");
    Vec::new()
}

/// Normalize line endings and strip the invisible characters that OCR and
/// word processors sprinkle into exported text.
fn clean_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{200b}', "")
        .replace('\u{a0}', " ")
}

static CONTENT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:isi|content)\s*:\s*").unwrap());

/// Heading lines like "Notulensi Site MAOS_EP" or "Site notes: cilacap".
pub(crate) static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:📝\s*)?(?:notulensi\s+site|site\s+notes)\b").unwrap()
});

/// Date + time marker shared by the emoji passes: `📅 <date> ⏰ <hh:mm[:ss]>`.
pub(crate) static DATE_TIME_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"📅\s*(.*?)\s*⏰\s*([\d:]+)").unwrap());

/// Assemble a draft, enforcing the record-model invariants.
///
/// - a leading `isi:`/`content:` label is stripped from the content
/// - content failing the length/interior-space rule yields no draft
/// - `resolved_date` and `status == Resolved` imply each other: a resolved
///   date upgrades the status, a dateless resolved status is stamped with
///   the record's own date
pub(crate) fn finish_draft(
    ctx: &DocumentContext,
    date: Option<String>,
    time: Option<String>,
    content: &str,
    status: NoteStatus,
    resolved_date: Option<String>,
) -> Option<NoteDraft> {
    let content = CONTENT_LABEL.replace(content.trim(), "").trim().to_string();
    if !valid_content(&content) {
        debug!(content = %content, "dropping draft with invalid content");
        return None;
    }

    let date = clean_date(date).unwrap_or_else(|| ctx.default_date.clone());
    let time = time
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| ctx.default_time.clone());
    let resolved_date = clean_date(resolved_date);

    let (status, resolved_date) = match (status, resolved_date) {
        (_, Some(resolved)) => (NoteStatus::Resolved, Some(resolved)),
        (NoteStatus::Resolved, None) => (NoteStatus::Resolved, Some(date.clone())),
        (NoteStatus::Open, None) => (NoteStatus::Open, None),
    };

    Some(NoteDraft {
        site_id: ctx.site_id.clone(),
        content,
        status,
        created_date: date,
        created_time: time,
        resolved_date,
        provenance: ctx.provenance.clone(),
    })
}

/// Trim trailing dashes and whitespace off an extracted date fragment.
fn clean_date(date: Option<String>) -> Option<String> {
    let cleaned = date?.trim().trim_end_matches('-').trim().to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
