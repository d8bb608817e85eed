//! Tier 1: emoji-tagged blocks and lines
//!
//! Three passes over one shared consumed-line set, so a line claimed by an
//! earlier pass is never re-read by a later one:
//!
//! 1. three-line resolved item: `📅 … ⏰ …` / `✅ content` / `📌 Tanggal Selesai: …`
//! 2. open items: a `📅 … ⏰ …` header followed by one or more `⏳` lines
//! 3. single-line resolved item: `📅 … ⏰ … ✅ … 📌 …`

use crate::cascade::{finish_draft, DocumentContext, DATE_TIME_MARKER};
use fieldnote_domain::{NoteDraft, NoteStatus};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static RESOLVED_DATE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)📌\s*(?:tanggal\s+selesai|resolved(?:\s+date)?)[:：]?\s*(.*)").unwrap()
});

static SINGLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)📅\s*(.+?)\s*⏰\s*([\d:]+)\s*✅\s*(.+?)\s*📌\s*(?:tanggal\s+selesai|resolved(?:\s+date)?)[:：]?\s*(.+)",
    )
    .unwrap()
});

pub(crate) fn parse(text: &str, ctx: &DocumentContext) -> Option<Vec<NoteDraft>> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut consumed: HashSet<usize> = HashSet::new();
    let mut drafts = Vec::new();

    resolved_blocks(&lines, ctx, &mut consumed, &mut drafts);
    open_blocks(&lines, ctx, &mut consumed, &mut drafts);
    resolved_single_lines(&lines, ctx, &mut consumed, &mut drafts);

    if drafts.is_empty() {
        None
    } else {
        Some(drafts)
    }
}

/// Pass 1: date line, checkmark content line, pin resolved-date line.
fn resolved_blocks(
    lines: &[&str],
    ctx: &DocumentContext,
    consumed: &mut HashSet<usize>,
    drafts: &mut Vec<NoteDraft>,
) {
    let mut i = 0;
    while i < lines.len() {
        if consumed.contains(&i) {
            i += 1;
            continue;
        }

        if i + 2 < lines.len()
            && lines[i].contains('📅')
            && lines[i].contains('⏰')
            && lines[i + 1].contains('✅')
            && lines[i + 2].contains('📌')
        {
            let header = DATE_TIME_MARKER.captures(lines[i]);
            let resolved = RESOLVED_DATE_MARKER.captures(lines[i + 2]);
            if let (Some(header), Some(resolved)) = (header, resolved) {
                let content = lines[i + 1].replace('✅', "");
                if let Some(draft) = finish_draft(
                    ctx,
                    Some(header[1].to_string()),
                    Some(header[2].to_string()),
                    &content,
                    NoteStatus::Resolved,
                    Some(resolved[1].to_string()),
                ) {
                    drafts.push(draft);
                }
                consumed.extend([i, i + 1, i + 2]);
                i += 3;
                continue;
            }
        }
        i += 1;
    }
}

/// Pass 2: date header followed by hourglass-prefixed open items.
fn open_blocks(
    lines: &[&str],
    ctx: &DocumentContext,
    consumed: &mut HashSet<usize>,
    drafts: &mut Vec<NoteDraft>,
) {
    let mut i = 0;
    while i < lines.len() {
        if consumed.contains(&i) {
            i += 1;
            continue;
        }

        if lines[i].contains('📅') && lines[i].contains('⏰') {
            if let Some(header) = DATE_TIME_MARKER.captures(lines[i]) {
                let date = header[1].to_string();
                let time = header[2].to_string();
                let mut j = i + 1;
                while j < lines.len() && lines[j].starts_with('⏳') {
                    let content = lines[j].trim_start_matches('⏳');
                    if let Some(draft) = finish_draft(
                        ctx,
                        Some(date.clone()),
                        Some(time.clone()),
                        content,
                        NoteStatus::Open,
                        None,
                    ) {
                        drafts.push(draft);
                    }
                    consumed.insert(j);
                    j += 1;
                }
                consumed.insert(i);
                i = j;
                continue;
            }
        }
        i += 1;
    }
}

/// Pass 3: everything on one line.
fn resolved_single_lines(
    lines: &[&str],
    ctx: &DocumentContext,
    consumed: &mut HashSet<usize>,
    drafts: &mut Vec<NoteDraft>,
) {
    for (idx, line) in lines.iter().enumerate() {
        if consumed.contains(&idx) {
            continue;
        }
        if let Some(caps) = SINGLE_LINE.captures(line) {
            if let Some(draft) = finish_draft(
                ctx,
                Some(caps[1].to_string()),
                Some(caps[2].to_string()),
                &caps[3],
                NoteStatus::Resolved,
                Some(caps[4].to_string()),
            ) {
                drafts.push(draft);
            }
            consumed.insert(idx);
        }
    }
}
