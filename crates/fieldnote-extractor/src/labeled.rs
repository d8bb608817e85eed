//! Tier 2: labeled key:value documents
//!
//! Recognizes label lines (`tanggal`/`date`, `jam`/`time`, `status`,
//! `tanggal selesai`/`resolved date`, `isi`/`content`). A combined
//! date+time label line flushes the accumulating record and starts a new
//! one; unlabeled lines append to the current content buffer. The strategy
//! claims the document only when it saw at least one label line.

use crate::cascade::{finish_draft, DocumentContext, HEADING};
use fieldnote_domain::{NoteDraft, NoteStatus};
use regex::Regex;
use std::sync::LazyLock;

static DATE_AND_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:tanggal|date)\s*:\s*(.*?)\s*(?:jam|time)\s*:\s*([\d:]+)").unwrap()
});

static RESOLVED_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:tanggal\s+selesai|resolved\s+date)\s*:?").unwrap());

static STATUS_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^status\s*:?").unwrap());

static CONTENT_LABEL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:isi|content)\s*:").unwrap());

struct Accumulator {
    date: Option<String>,
    time: Option<String>,
    status: NoteStatus,
    resolved_date: Option<String>,
    buffer: Vec<String>,
}

impl Accumulator {
    /// Emit the buffered record, if any, and reset the per-record fields.
    /// The date/time context is sticky until the next date+time line.
    fn flush(&mut self, ctx: &DocumentContext, drafts: &mut Vec<NoteDraft>) {
        if !self.buffer.is_empty() {
            let content = self.buffer.join(" ");
            if let Some(draft) = finish_draft(
                ctx,
                self.date.clone(),
                self.time.clone(),
                &content,
                self.status,
                self.resolved_date.take(),
            ) {
                drafts.push(draft);
            }
        }
        self.buffer.clear();
        self.status = NoteStatus::Open;
        self.resolved_date = None;
    }
}

pub(crate) fn parse(text: &str, ctx: &DocumentContext) -> Option<Vec<NoteDraft>> {
    let mut drafts = Vec::new();
    let mut acc = Accumulator {
        date: None,
        time: None,
        status: NoteStatus::Open,
        resolved_date: None,
        buffer: Vec::new(),
    };
    let mut saw_label = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || HEADING.is_match(line) {
            continue;
        }
        let lc = line.to_lowercase();

        if RESOLVED_LABEL.is_match(line) {
            saw_label = true;
            acc.resolved_date = line.split_once(':').map(|(_, v)| v.trim().to_string());
        } else if lc.starts_with("tanggal") || lc.starts_with("date") {
            // A date+time line opens a new record; date-only lines without a
            // time component fall through to the content buffer.
            if let Some(caps) = DATE_AND_TIME.captures(line) {
                saw_label = true;
                acc.flush(ctx, &mut drafts);
                acc.date = Some(caps[1].to_string());
                acc.time = Some(caps[2].to_string());
            } else {
                acc.buffer.push(line.to_string());
            }
        } else if STATUS_LABEL.is_match(line) {
            saw_label = true;
            let value = line.split_once(':').map(|(_, v)| v).unwrap_or("");
            acc.status = NoteStatus::parse(value);
        } else if CONTENT_LABEL_LINE.is_match(line) {
            saw_label = true;
            if let Some((_, value)) = line.split_once(':') {
                acc.buffer.push(value.trim().to_string());
            }
        } else {
            acc.buffer.push(line.to_string());
        }
    }
    acc.flush(ctx, &mut drafts);

    if saw_label && !drafts.is_empty() {
        Some(drafts)
    } else {
        None
    }
}
