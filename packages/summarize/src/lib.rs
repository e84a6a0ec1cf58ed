#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Permit summaries and per-field export.
//!
//! [`Summarizer`] ties a [`DocumentLoader`] to the slot extractor: it
//! loads a document, runs [`field_permits_permit::extract`], and reports
//! the result with a few text statistics. [`export`] goes one step further
//! and files every parsed slot row under a sheet named after its field.
//!
//! The loader is borrowed, never owned or looked up globally, so one
//! instance built at startup serves every call.

pub mod export;
pub mod progress;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use field_permits_document::{DocumentError, DocumentKind, DocumentLoader};
use field_permits_permit::{ExtractError, ExtractOptions, ExtractionResult};
use serde::Serialize;

use crate::progress::ProgressCallback;

/// Number of characters kept in a summary preview.
pub const PREVIEW_CHARS: usize = 500;

/// Errors raised while summarizing or exporting a permit.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    /// The document could not be loaded.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Slot extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A slot row failed to parse in strict mode.
    #[error("row under '{field}' failed to parse: {source}")]
    Row {
        /// Field header the slot belongs to.
        field: String,
        #[source]
        source: field_permits_permit::RowError,
    },

    /// Writing the workbook failed.
    #[error(transparent)]
    Workbook(#[from] field_permits_workbook::WorkbookError),
}

/// Statistics and extracted slots for one permit document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermitSummary {
    /// File path, or a caller-supplied title for in-memory text.
    pub source: String,
    pub file_type: DocumentKind,
    /// PDF page count; `1` for text.
    pub pages: usize,
    pub word_count: usize,
    pub character_count: usize,
    /// The first [`PREVIEW_CHARS`] characters, with `...` appended when
    /// the text is longer.
    pub preview: String,
    #[serde(flatten)]
    pub extraction: ExtractionResult,
}

/// Returns the first [`PREVIEW_CHARS`] characters of `text`, marking
/// truncation with `...`.
#[must_use]
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}

/// Summarizes text that is already in memory.
///
/// # Errors
///
/// Returns [`SummarizeError::Extract`] if extraction fails under the
/// configured orphan policy.
pub fn summarize_text(
    text: &str,
    title: &str,
    options: &ExtractOptions,
) -> Result<PermitSummary, SummarizeError> {
    log::debug!("Summarizing permit from text: {title}");

    let extraction = field_permits_permit::extract(text, options)?;

    Ok(PermitSummary {
        source: title.to_owned(),
        file_type: DocumentKind::Text,
        pages: 1,
        word_count: text.split_whitespace().count(),
        character_count: text.chars().count(),
        preview: preview(text),
        extraction,
    })
}

/// Outcome of summarizing one file in a batch.
#[derive(Debug)]
pub struct SummaryOutcome {
    pub path: PathBuf,
    pub result: Result<PermitSummary, SummarizeError>,
}

/// Per-file outcomes of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<SummaryOutcome>,
}

impl BatchReport {
    /// Number of files summarized without error.
    #[must_use]
    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Summarizes permit documents read through a borrowed loader.
pub struct Summarizer<'a, L: DocumentLoader + ?Sized> {
    loader: &'a L,
    options: ExtractOptions,
}

impl<'a, L: DocumentLoader + ?Sized> Summarizer<'a, L> {
    #[must_use]
    pub const fn new(loader: &'a L, options: ExtractOptions) -> Self {
        Self { loader, options }
    }

    #[must_use]
    pub const fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Loads and summarizes one document.
    ///
    /// # Errors
    ///
    /// Returns [`SummarizeError`] if the document cannot be loaded or
    /// extraction fails.
    pub fn summarize_file(&self, path: &Path) -> Result<PermitSummary, SummarizeError> {
        log::debug!("Summarizing permit from file: {}", path.display());

        let text = self.loader.read_text(path)?;
        let info = self.loader.info(path)?;

        let mut summary = summarize_text(&text, &info.path.display().to_string(), &self.options)?;
        summary.file_type = info.kind;
        summary.pages = match info.kind {
            DocumentKind::Pdf => info.pages.unwrap_or(0),
            DocumentKind::Text => 1,
        };

        log::info!("Successfully summarized permit from {}", path.display());

        Ok(summary)
    }

    /// Summarizes every path, recording failures instead of stopping.
    pub fn batch(&self, paths: &[PathBuf], progress: &Arc<dyn ProgressCallback>) -> BatchReport {
        log::debug!("Batch summarizing {} files", paths.len());
        progress.set_total(paths.len() as u64);

        let mut report = BatchReport::default();

        for path in paths {
            progress.set_message(path.display().to_string());
            let result = self.summarize_file(path);
            if let Err(e) = &result {
                log::error!("Error summarizing permit from {}: {e}", path.display());
            }
            report.outcomes.push(SummaryOutcome {
                path: path.clone(),
                result,
            });
            progress.inc(1);
        }

        let msg = format!(
            "Batch summarization complete: {}/{} successful",
            report.successful(),
            report.total()
        );
        log::info!("{msg}");
        progress.finish(msg);

        report
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::null_progress;
    use crate::test_support::{MemoryLoader, PERMIT};

    #[test]
    fn preview_truncates_on_char_boundary() {
        let short = "é".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&short), short);

        let long = "é".repeat(PREVIEW_CHARS + 1);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn summarizes_text_statistics() {
        let summary = summarize_text("one two\nthree", "Inline", &ExtractOptions::default()).unwrap();
        assert_eq!(summary.source, "Inline");
        assert_eq!(summary.word_count, 3);
        assert_eq!(summary.character_count, 13);
        assert_eq!(summary.pages, 1);
        assert!(summary.extraction.field_names.is_empty());
    }

    #[test]
    fn summarizes_file_through_loader() {
        let loader = MemoryLoader::default().with("permit.txt", PERMIT);
        let summarizer = Summarizer::new(&loader, ExtractOptions::default());

        let summary = summarizer.summarize_file(Path::new("permit.txt")).unwrap();
        assert_eq!(summary.source, "permit.txt");
        assert_eq!(summary.file_type, DocumentKind::Text);
        assert_eq!(summary.extraction.field_names.len(), 2);
        assert_eq!(summary.extraction.date_time_slots.len(), 3);
    }

    #[test]
    fn pdf_summary_reports_kind_and_page_count() {
        let loader = MemoryLoader::default().with_pdf(
            "permit.pdf",
            &[
                "North Field (Athletic Field Use)\nSat, Dec 6, 2025 8:00 AM Sat, Dec 6, 2025 1:00 PM $25",
                "",
                "Page three",
            ],
        );
        let summarizer = Summarizer::new(&loader, ExtractOptions::default());

        let summary = summarizer.summarize_file(Path::new("permit.pdf")).unwrap();
        assert_eq!(summary.file_type, DocumentKind::Pdf);
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.extraction.date_time_slots.len(), 1);
        assert!(summary.preview.ends_with("Page three"));
    }

    #[test]
    fn batch_records_failures_without_stopping() {
        let loader = MemoryLoader::default().with("a.txt", PERMIT);
        let summarizer = Summarizer::new(&loader, ExtractOptions::default());

        let paths = vec![PathBuf::from("missing.txt"), PathBuf::from("a.txt")];
        let report = summarizer.batch(&paths, &null_progress());

        assert_eq!(report.total(), 2);
        assert_eq!(report.successful(), 1);
        assert!(matches!(
            report.outcomes[0].result,
            Err(SummarizeError::Document(DocumentError::NotFound(_)))
        ));
    }

    #[test]
    fn summary_json_flattens_extraction() {
        let summary = summarize_text(PERMIT, "Inline", &ExtractOptions::default()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["file_type"], "text");
        assert_eq!(json["field_names"].as_array().unwrap().len(), 2);
        assert_eq!(
            json["field_date_time_slots"]["Central Park Field (Athletic Field Use)"]
                .as_array()
                .unwrap()
                .len(),
            1
        );
    }
}
