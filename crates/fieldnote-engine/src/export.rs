//! File export
//!
//! Writes the session's current note set to disk. Plain text mirrors the
//! viewer's bullet rendering; PDF renders a centered title and one
//! paragraph per record. Both operate on the session buffer, so they export
//! whatever was last shown: a capture batch, a merged view, or a recap.

use crate::engine::{Backend, Engine};
use crate::error::EngineError;
use chrono::NaiveDate;
use fieldnote_dates::parse_day_first;
use fieldnote_domain::{NoteRecord, NoteStatus};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain text, viewer-style bullets.
    Txt,
    /// PDF document, one paragraph per record.
    Pdf,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

impl<S: Backend> Engine<S> {
    /// Export the session's pending notes to a file; returns its path.
    pub fn export(&self, format: ExportFormat, user_id: &str) -> Result<PathBuf, EngineError> {
        let mut store = self.lock_store();
        let mut session = self.sessions.get(&*store, user_id);

        let site = match (&session.active_site, session.pending_notes.is_empty()) {
            (Some(site), false) => site.clone(),
            _ => {
                return Err(EngineError::validation(format!(
                    "⚠ Cannot export {}; capture or show notes first.",
                    format.extension().to_uppercase()
                )))
            }
        };

        let dir = match format {
            ExportFormat::Txt => &self.config.txt_dir,
            ExportFormat::Pdf => &self.config.pdf_dir,
        };
        fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "{}_{}.{}",
            site.to_uppercase(),
            self.file_stamp(),
            format.extension()
        ));

        match format {
            ExportFormat::Txt => write_txt(&path, &site, &session.pending_notes)?,
            ExportFormat::Pdf => write_pdf(&path, &site, &session.pending_notes)?,
        }

        session.last_export_path = Some(path.display().to_string());
        self.sessions.put(&mut *store, user_id, session);

        info!(user_id, path = %path.display(), "notes exported");
        Ok(path)
    }

    /// Compact `yyyymmdd_hhmmss` stamp derived from the clock.
    fn file_stamp(&self) -> String {
        let ts = self.now();
        let date = parse_day_first(&ts.date, chrono::Local::now().date_naive())
            .unwrap_or(NaiveDate::MIN);
        format!("{}_{}", date.format("%Y%m%d"), ts.time.replace(':', ""))
    }
}

fn write_txt(path: &PathBuf, site: &str, notes: &[NoteRecord]) -> Result<(), EngineError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "📝 Site Notes {}\n", site.to_uppercase())?;
    for note in notes {
        writeln!(
            out,
            "📅 {} ⏰ {}\n{} {}\n",
            note.created_date,
            note.created_time,
            note.status.glyph(),
            note.content
        )?;
    }
    out.flush()?;
    Ok(())
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TOP_MARGIN_MM: f32 = 20.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 6.0;

fn write_pdf(path: &PathBuf, site: &str, notes: &[NoteRecord]) -> Result<(), EngineError> {
    let title = format!("Site Notes {}", site.to_uppercase());
    let (doc, page, layer) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "notes");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| EngineError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| EngineError::Pdf(e.to_string()))?;

    let mut writer = PdfWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT_MM - TOP_MARGIN_MM,
    };

    // Centered-ish title; builtin fonts expose no metrics, so approximate.
    let title_x = (PAGE_WIDTH_MM - title.len() as f32 * 2.8) / 2.0;
    writer.line(&title, 14.0, title_x.max(15.0), &bold);
    writer.advance();

    for note in notes {
        let status = match note.status {
            NoteStatus::Resolved => "Resolved",
            NoteStatus::Open => "Open",
        };
        writer.line(
            &format!("Date: {} - Time: {}", note.created_date, note.created_time),
            12.0,
            15.0,
            &font,
        );
        writer.line(&format!("Note: {}", sanitize_ascii(&note.content)), 12.0, 15.0, &font);
        writer.line(&format!("Status: {status}"), 12.0, 15.0, &font);
        writer.advance();
    }

    doc.save(&mut BufWriter::new(File::create(path)?))
        .map_err(|e| EngineError::Pdf(e.to_string()))?;
    Ok(())
}

/// Line-oriented PDF cursor; opens a new page when the current one fills.
struct PdfWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PdfWriter<'_> {
    fn line(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        if self.y < BOTTOM_MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "notes");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - TOP_MARGIN_MM;
        }
        self.layer
            .use_text(sanitize_ascii(text), size, Mm(x), Mm(self.y), font);
        self.y -= LINE_HEIGHT_MM;
    }

    fn advance(&mut self) {
        self.y -= LINE_HEIGHT_MM / 2.0;
    }
}

/// Builtin PDF fonts cover only ASCII; drop everything else.
fn sanitize_ascii(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}
