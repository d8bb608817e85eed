//! Lenient, fail-open date normalization

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Outcome of normalizing a date phrase.
///
/// `Parsed` carries a real calendar date whose [`display_key`] is canonical;
/// `Unparsed` carries the original input verbatim. Callers persisting an
/// `Unparsed` value accept a best-effort key.
///
/// [`display_key`]: NormalizedDate::display_key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDate {
    /// Successfully parsed calendar date.
    Parsed(NaiveDate),
    /// Input could not be parsed; preserved unchanged.
    Unparsed(String),
}

impl NormalizedDate {
    /// The string used as a storage/query key: canonical long form for
    /// parsed dates, the original input otherwise.
    pub fn display_key(&self) -> String {
        match self {
            NormalizedDate::Parsed(date) => canonical_display(*date),
            NormalizedDate::Unparsed(original) => original.clone(),
        }
    }

    /// Whether normalization succeeded.
    pub fn is_parsed(&self) -> bool {
        matches!(self, NormalizedDate::Parsed(_))
    }
}

/// Canonical long-form display of a date: `Monday, 04 August 2025`.
pub fn canonical_display(date: NaiveDate) -> String {
    date.format("%A, %d %B %Y").to_string()
}

/// Normalize a natural-language date phrase.
///
/// Supports relative phrases (`today`/`hari ini`, `yesterday`/`kemarin`,
/// `tomorrow`/`besok`) and absolute day-first forms (`4/8/2025`,
/// `04-08-2025`, `4 august 2025`, `4 agustus`). Anything else comes back
/// as [`NormalizedDate::Unparsed`].
pub fn normalize(input: &str, today: NaiveDate) -> NormalizedDate {
    let phrase = input.trim();
    if phrase.is_empty() {
        return NormalizedDate::Unparsed(input.to_string());
    }

    if let Some(date) = relative_phrase(phrase, today) {
        return NormalizedDate::Parsed(date);
    }
    if let Some(date) = parse_day_first(phrase, today) {
        return NormalizedDate::Parsed(date);
    }
    NormalizedDate::Unparsed(input.to_string())
}

fn relative_phrase(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    match phrase.to_lowercase().as_str() {
        "hari ini" | "today" => Some(today),
        "kemarin" | "yesterday" => today.checked_sub_days(Days::new(1)),
        "besok" | "tomorrow" => today.checked_add_days(Days::new(1)),
        _ => None,
    }
}

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/\-.](\d{1,2})(?:[/\-.](\d{2,4}))?$").unwrap()
});

static TEXTUAL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\s+([[:alpha:]]+)(?:\s+(\d{4}))?$").unwrap()
});

/// Day-first lenient parser, also used to re-read stored date keys.
///
/// A leading weekday ("Monday, 04 August 2025") is stripped before parsing.
/// A missing year defaults to `today`'s year.
pub fn parse_day_first(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut text = input.trim().to_lowercase();

    // Stored canonical keys carry a "Weekday, " prefix; drop it.
    if let Some((_, rest)) = text.split_once(',') {
        let rest = rest.trim();
        if !rest.is_empty() {
            text = rest.to_string();
        }
    }

    if let Some(caps) = NUMERIC_DATE.captures(&text) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = match caps.get(3) {
            Some(y) => expand_year(y.as_str().parse().ok()?),
            None => today.year(),
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = TEXTUAL_DATE.captures(&text) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year = match caps.get(3) {
            Some(y) => y.as_str().parse().ok()?,
            None => today.year(),
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn expand_year(year: i32) -> i32 {
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

/// Month number from an English or Indonesian month name (full or
/// three-letter abbreviation).
pub fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [(&str, &str, u32); 12] = [
        ("january", "januari", 1),
        ("february", "februari", 2),
        ("march", "maret", 3),
        ("april", "april", 4),
        ("may", "mei", 5),
        ("june", "juni", 6),
        ("july", "juli", 7),
        ("august", "agustus", 8),
        ("september", "september", 9),
        ("october", "oktober", 10),
        ("november", "november", 11),
        ("december", "desember", 12),
    ];

    let lc = name.trim().to_lowercase();
    if lc.len() < 3 {
        return None;
    }
    for (en, id, num) in MONTHS {
        if en == lc || id == lc || en.starts_with(&lc) || id.starts_with(&lc) {
            return Some(num);
        }
    }
    None
}
