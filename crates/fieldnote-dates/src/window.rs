//! Recap window resolution from natural-language expressions

use crate::normalize::{month_from_name, parse_day_first};
use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors from window resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    /// No supported window expression matched.
    #[error(
        "unrecognized recap window; supported forms: 'this week', 'last week', \
         'this month', 'last month', 'month <name> [year]', \
         'month <name> [year] day <d1> to <d2>', 'from <date> to <date>' \
         (Indonesian equivalents accepted)"
    )]
    Unrecognized,

    /// A month/day/date fragment inside a matched expression did not parse.
    #[error("could not interpret date fragment '{0}' in recap window")]
    BadFragment(String),
}

/// An inclusive `[start, end]` date range computed from a window expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecapWindow {
    /// First day of the window.
    pub start: NaiveDate,
    /// Last day of the window.
    pub end: NaiveDate,
}

impl RecapWindow {
    /// Whether a date falls inside the window, bounds inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Short header form, e.g. "04 August – 10 August 2025".
    pub fn label(&self) -> String {
        format!(
            "{} – {}",
            self.start.format("%d %B"),
            self.end.format("%d %B %Y")
        )
    }
}

static MONTH_DAY_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:bulan|month)\s+([[:alpha:]]+)\s*(\d{4})?\s+(?:tanggal|day)\s+(\d{1,2})\s+(?:sampai|to)\s+(\d{1,2})",
    )
    .unwrap()
});

static MONTH_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:bulan|month)\s+([[:alpha:]]+)\s*(\d{4})?").unwrap());

static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:dari|from)\s+([\w\s/\-.]+?)\s+(?:sampai|to)\s+([\w\s/\-.]+)").unwrap()
});

/// Resolve a natural-language window expression against `today`.
///
/// Patterns are tried in a fixed priority order; the first match wins.
pub fn resolve_window(text: &str, today: NaiveDate) -> Result<RecapWindow, WindowError> {
    let text = text.to_lowercase();

    if text.contains("minggu ini") || text.contains("this week") {
        let start = week_start(today);
        return Ok(RecapWindow { start, end: today });
    }

    if text.contains("minggu kemarin") || text.contains("minggu lalu") || text.contains("last week")
    {
        let start = week_start(today) - Days::new(7);
        return Ok(RecapWindow {
            start,
            end: start + Days::new(6),
        });
    }

    if text.contains("bulan ini") || text.contains("this month") {
        return Ok(RecapWindow {
            start: today.with_day(1).unwrap_or(today),
            end: today,
        });
    }

    if text.contains("bulan kemarin") || text.contains("bulan lalu") || text.contains("last month")
    {
        let first_of_this = today.with_day(1).unwrap_or(today);
        let end = first_of_this - Days::new(1);
        return Ok(RecapWindow {
            start: end.with_day(1).unwrap_or(end),
            end,
        });
    }

    if let Some(caps) = MONTH_DAY_RANGE.captures(&text) {
        let month = named_month(&caps[1])?;
        let year = captured_year(caps.get(2), today);
        let d1: u32 = caps[3].parse().map_err(|_| bad(&caps[3]))?;
        let d2: u32 = caps[4].parse().map_err(|_| bad(&caps[4]))?;
        return Ok(RecapWindow {
            start: NaiveDate::from_ymd_opt(year, month, d1).ok_or_else(|| bad(&caps[3]))?,
            end: NaiveDate::from_ymd_opt(year, month, d2).ok_or_else(|| bad(&caps[4]))?,
        });
    }

    if let Some(caps) = MONTH_ONLY.captures(&text) {
        let month = named_month(&caps[1])?;
        let year = captured_year(caps.get(2), today);
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| bad(&caps[1]))?;
        return Ok(RecapWindow {
            start,
            end: month_end(year, month).ok_or_else(|| bad(&caps[1]))?,
        });
    }

    if let Some(caps) = DATE_RANGE.captures(&text) {
        let start = parse_day_first(caps[1].trim(), today).ok_or_else(|| bad(&caps[1]))?;
        let end = parse_day_first(caps[2].trim(), today).ok_or_else(|| bad(&caps[2]))?;
        return Ok(RecapWindow { start, end });
    }

    Err(WindowError::Unrecognized)
}

fn bad(fragment: &str) -> WindowError {
    WindowError::BadFragment(fragment.trim().to_string())
}

fn named_month(name: &str) -> Result<u32, WindowError> {
    month_from_name(name).ok_or_else(|| bad(name))
}

fn captured_year(capture: Option<regex::Match<'_>>, today: NaiveDate) -> i32 {
    capture
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or_else(|| today.year())
}

/// Monday of the ISO week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Last day of the given calendar month.
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(first_of_next - Days::new(1))
}
