//! Wall-clock provider

use crate::normalize::canonical_display;
use chrono::Local;
use fieldnote_domain::{Clock, Timestamp};

/// System wall clock emitting canonical display strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Today's date, for window arithmetic.
    pub fn today(&self) -> chrono::NaiveDate {
        Local::now().date_naive()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let now = Local::now();
        Timestamp {
            date: canonical_display(now.date_naive()),
            time: now.format("%H:%M:%S").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_shape() {
        let ts = SystemClock.now();
        // "Weekday, DD Month YYYY" always contains a comma and a space-split
        // of at least four parts; time is HH:MM:SS.
        assert!(ts.date.contains(", "));
        assert!(ts.date.split_whitespace().count() >= 4);
        assert_eq!(ts.time.len(), 8);
        assert_eq!(ts.time.matches(':').count(), 2);
    }
}
