//! Shared report formatting
//!
//! All read paths (viewer, recap, text export) render records the same way:
//! a date/time header line, then one bullet per content line, each bullet
//! carrying the record's status glyph.

use fieldnote_domain::{NoteRecord, NoteStatus};

/// One bullet per non-empty content line, glyph-prefixed.
pub(crate) fn bullet_lines(record: &NoteRecord) -> Vec<String> {
    let glyph = record.status.glyph();
    record
        .content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| format!("{glyph} {l}"))
        .collect()
}

/// ` (✅ resolved: <date>)` for resolved records, empty otherwise.
pub(crate) fn resolved_suffix(record: &NoteRecord) -> String {
    match (&record.status, &record.resolved_date) {
        (NoteStatus::Resolved, Some(date)) => format!(" (✅ resolved: {date})"),
        _ => String::new(),
    }
}

/// Full display entry for one record, optionally tagged with its site.
///
/// `with_site` is used when the surrounding report is not already scoped to
/// a single site.
pub(crate) fn entry(record: &NoteRecord, with_site: bool) -> String {
    let site_tag = if with_site {
        format!("📍 {} ", record.site_id.to_uppercase())
    } else {
        String::new()
    };
    format!(
        "📅 {} - {site_tag}⏰ {}{}\n{}",
        record.created_date,
        record.created_time,
        resolved_suffix(record),
        bullet_lines(record).join("\n"),
    )
}

/// Split a record into one record per content line, preserving all other
/// fields. Viewer and recap both display multi-line content as independent
/// bullets; this is the buffered form of that explosion.
pub(crate) fn explode(record: &NoteRecord) -> Vec<NoteRecord> {
    let lines: Vec<&str> = record
        .content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() <= 1 {
        return vec![record.clone()];
    }
    lines
        .into_iter()
        .map(|line| {
            let mut point = record.clone();
            point.content = line.to_string();
            point
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldnote_domain::{NoteDraft, NoteId, NoteRecord};

    fn record(content: &str) -> NoteRecord {
        NoteRecord::from_draft(
            NoteId::new(),
            NoteDraft::open("maos_ep", content, "Monday, 04 August 2025", "09:00:00"),
        )
    }

    #[test]
    fn test_multiline_content_becomes_bullets() {
        let rec = record("genset turun lagi\nantena miring ke barat");
        let bullets = bullet_lines(&rec);
        assert_eq!(bullets.len(), 2);
        assert!(bullets[0].starts_with("⏳ "));
    }

    #[test]
    fn test_resolved_suffix_requires_date() {
        let mut rec = record("genset sudah diperbaiki");
        assert!(resolved_suffix(&rec).is_empty());

        rec.status = fieldnote_domain::NoteStatus::Resolved;
        rec.resolved_date = Some("Tuesday, 05 August 2025".to_string());
        assert_eq!(resolved_suffix(&rec), " (✅ resolved: Tuesday, 05 August 2025)");
    }

    #[test]
    fn test_entry_site_tag() {
        let rec = record("genset turun lagi");
        assert!(entry(&rec, true).contains("📍 MAOS_EP"));
        assert!(!entry(&rec, false).contains("📍"));
    }

    #[test]
    fn test_explode_preserves_fields() {
        let rec = record("line one here\nline two here");
        let points = explode(&rec);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, rec.id);
        assert_eq!(points[1].content, "line two here");

        let single = record("only one line");
        assert_eq!(explode(&single), vec![single.clone()]);
    }
}
