//! Per-field workbook export.
//!
//! Every slot line under a field header is parsed into a row and filed
//! under a sheet named after the facility (the header minus its
//! `(Athletic Field Use)` marker).

use std::path::Path;

use field_permits_document::DocumentLoader;
use field_permits_permit::{ExtractOptions, ExtractionResult, RowError, RowOptions, parse_row_with};
use field_permits_workbook::RowSink;

use crate::SummarizeError;

/// Options for turning slot lines into rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Document-level issued date copied into every row.
    pub issued_date: String,
    pub row: RowOptions,
    /// Abort on the first row that fails to parse instead of skipping it.
    pub strict: bool,
}

/// A slot line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub field: String,
    pub line: String,
    pub error: RowError,
}

/// What an export wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Sheets that received at least one row, in order.
    pub sheets: Vec<String>,
    pub rows_written: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Parses every indexed slot line and files the rows in `sink`.
///
/// Fields without slots produce no sheet.
///
/// # Errors
///
/// Returns [`SummarizeError::Row`] for the first malformed slot when
/// `options.strict` is set.
pub fn export_rows<S: RowSink + ?Sized>(
    extraction: &ExtractionResult,
    options: &ExportOptions,
    sink: &mut S,
) -> Result<ExportReport, SummarizeError> {
    let mut report = ExportReport::default();

    for field in &extraction.field_date_time_slots {
        let sheet = field.facility_name();
        let mut wrote_any = false;

        for line in &field.slots {
            match parse_row_with(line, &options.issued_date, &options.row) {
                Ok(row) => {
                    sink.add_row(sheet, row.into_record());
                    report.rows_written += 1;
                    wrote_any = true;
                }
                Err(source) if options.strict => {
                    return Err(SummarizeError::Row {
                        field: field.name.clone(),
                        source,
                    });
                }
                Err(error) => {
                    log::warn!("Skipping row under '{}': {error}", field.name);
                    report.skipped.push(SkippedRow {
                        field: field.name.clone(),
                        line: line.clone(),
                        error,
                    });
                }
            }
        }

        if wrote_any && !report.sheets.iter().any(|s| s == sheet) {
            report.sheets.push(sheet.to_owned());
        }
    }

    log::debug!(
        "Exported {} row(s) into {} sheet(s), skipped {}",
        report.rows_written,
        report.sheets.len(),
        report.skipped.len()
    );

    Ok(report)
}

/// Loads a document, extracts its slots, and exports them into `sink`.
///
/// # Errors
///
/// Returns [`SummarizeError`] if loading, extraction, or (in strict mode)
/// row parsing fails.
pub fn export_document<L: DocumentLoader + ?Sized, S: RowSink + ?Sized>(
    loader: &L,
    path: &Path,
    extract_options: &ExtractOptions,
    options: &ExportOptions,
    sink: &mut S,
) -> Result<ExportReport, SummarizeError> {
    let text = loader.read_text(path)?;
    let extraction = field_permits_permit::extract(&text, extract_options)?;
    let report = export_rows(&extraction, options, sink)?;

    log::info!(
        "Exported {} row(s) from {} into {} sheet(s)",
        report.rows_written,
        path.display(),
        report.sheets.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use field_permits_permit::{ClockConversion, extract_slots};
    use field_permits_workbook::Workbook;

    use super::*;
    use crate::test_support::{MemoryLoader, PERMIT};

    fn options() -> ExportOptions {
        ExportOptions {
            issued_date: "2025-11-01".to_owned(),
            row: RowOptions::default(),
            strict: false,
        }
    }

    #[test]
    fn files_rows_under_facility_sheets() {
        let loader = MemoryLoader::default().with("permit.txt", PERMIT);
        let mut wb = Workbook::new();

        let report = export_document(
            &loader,
            Path::new("permit.txt"),
            &ExtractOptions::default(),
            &options(),
            &mut wb,
        )
        .unwrap();

        assert_eq!(report.rows_written, 3);
        assert_eq!(report.sheets, vec!["Shoreline North Field", "Central Park Field"]);
        assert_eq!(wb.sheet_names(), vec!["Shoreline North Field", "Central Park Field"]);

        let central = wb.sheet("Central Park Field").unwrap();
        let row = &central.rows()[0];
        assert_eq!(row["day"], "Wed");
        assert_eq!(row["date"], "Dec 10, 2025");
        assert_eq!(row["start"], "12:00");
        assert_eq!(row["end"], "17:00");
        assert_eq!(row["cost"], "$40");
        assert_eq!(row["issued-date"], "2025-11-01");
    }

    #[test]
    fn legacy_clock_flows_through_export() {
        let extraction = extract_slots(PERMIT, 500);
        let mut wb = Workbook::new();
        let mut opts = options();
        opts.row.clock = ClockConversion::Legacy;

        export_rows(&extraction, &opts, &mut wb).unwrap();

        let central = wb.sheet("Central Park Field").unwrap();
        assert_eq!(central.rows()[0]["start"], "24:00");
    }

    #[test]
    fn malformed_rows_are_skipped_or_fatal() {
        // Matches the slot grammar but lacks a cost token.
        let text = "\
North Field (Athletic Field Use)
Sat, Dec 6, 2025 8:00 AM Sat, Dec 6, 2025 1:00 PM
Sat, Dec 6, 2025 2:00 PM Sat, Dec 6, 2025 3:00 PM $5
";
        let extraction = extract_slots(text, 500);
        assert_eq!(extraction.date_time_slots.len(), 2);

        let mut wb = Workbook::new();
        let report = export_rows(&extraction, &options(), &mut wb).unwrap();
        assert_eq!(report.rows_written, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            report.skipped[0].error,
            RowError::MissingToken { token: "cost", .. }
        ));

        let mut strict = options();
        strict.strict = true;
        let err = export_rows(&extraction, &strict, &mut Workbook::new()).unwrap_err();
        assert!(matches!(err, SummarizeError::Row { .. }));
    }

    #[test]
    fn empty_fields_produce_no_sheet() {
        let extraction = extract_slots("Empty Field (Athletic Field Use)\n", 500);
        let mut wb = Workbook::new();
        let report = export_rows(&extraction, &options(), &mut wb).unwrap();
        assert!(report.sheets.is_empty());
        assert!(wb.sheet_names().is_empty());
    }
}
