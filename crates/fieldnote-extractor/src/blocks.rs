//! Tier 3: generic blank-line-separated blocks
//!
//! The last-resort recognizer. Text is split on blank lines; each block
//! becomes at most one record. Heading-only blocks are discarded; within a
//! block a `status:` line sets the status and a `tanggal selesai:` /
//! `resolved date:` line sets the resolution date; everything else is
//! content.

use crate::cascade::{finish_draft, DocumentContext, HEADING};
use fieldnote_domain::{NoteDraft, NoteStatus};
use regex::Regex;
use std::sync::LazyLock;

static BLOCK_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^status\s*:?").unwrap());

static RESOLVED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:tanggal\s+selesai|resolved\s+date)\s*:?").unwrap());

pub(crate) fn parse(text: &str, ctx: &DocumentContext) -> Option<Vec<NoteDraft>> {
    let mut drafts = Vec::new();

    for block in BLOCK_SPLIT.split(text.trim()) {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() || lines.iter().any(|l| HEADING.is_match(l)) {
            continue;
        }

        let mut content = Vec::new();
        let mut status = NoteStatus::Open;
        let mut resolved_date = None;

        for line in lines {
            if STATUS_LINE.is_match(line) {
                let value = line.split_once(':').map(|(_, v)| v).unwrap_or("");
                status = NoteStatus::parse(value);
            } else if RESOLVED_LINE.is_match(line) {
                resolved_date = line.split_once(':').map(|(_, v)| v.trim().to_string());
            } else {
                content.push(line);
            }
        }

        // A block with only status/date lines yields nothing.
        if content.is_empty() {
            continue;
        }

        if let Some(draft) =
            finish_draft(ctx, None, None, &content.join(" "), status, resolved_date)
        {
            drafts.push(draft);
        }
    }

    if drafts.is_empty() {
        None
    } else {
        Some(drafts)
    }
}
