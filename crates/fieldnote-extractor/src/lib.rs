//! Fieldnote Extractor
//!
//! Converts the plain text of an uploaded maintenance document into note
//! drafts via an ordered cascade of format recognizers.
//!
//! # Architecture
//!
//! ```text
//! Document text → [emoji-tagged] → [labeled key:value] → [generic blocks]
//! ```
//!
//! Strategies are tried top to bottom; the **first one that yields at least
//! one draft wins** and the rest are skipped. This is a fallback cascade,
//! not a union: a document containing both emoji-tagged lines and free-form
//! paragraphs is parsed entirely by the emoji recognizer.
//!
//! Each strategy tracks the input lines it has consumed so multiple passes
//! within one tier never emit two drafts from the same line.
//!
//! # Example
//!
//! ```
//! use fieldnote_extractor::{parse_document, DocumentContext};
//!
//! let ctx = DocumentContext::new("maos_ep", "Monday, 04 August 2025", "08:00:00");
//! let drafts = parse_document("📅 Monday, 04 August 2025 ⏰ 08:00\n⏳ genset turun lagi\n", &ctx);
//! assert_eq!(drafts.len(), 1);
//! ```

#![warn(missing_docs)]

mod blocks;
mod cascade;
mod emoji;
mod labeled;

pub use cascade::{parse_document, DocumentContext};
