//! Fieldnote Dates
//!
//! Date handling for the engine: the lenient date normalizer, recap window
//! resolution, and the wall-clock provider.
//!
//! All persisted date keys use one canonical long form,
//! `Weekday, DD Month YYYY` (e.g. `Monday, 04 August 2025`). The normalizer
//! is deliberately fail-open: input it cannot parse is passed through
//! unchanged as [`NormalizedDate::Unparsed`], so a capture or update never
//! hard-fails purely because of an unrecognized date phrase. Callers must
//! pattern-match rather than assume canonical form.

#![warn(missing_docs)]

pub mod clock;
pub mod normalize;
pub mod window;

pub use clock::SystemClock;
pub use normalize::{canonical_display, normalize, parse_day_first, NormalizedDate};
pub use window::{resolve_window, RecapWindow, WindowError};
