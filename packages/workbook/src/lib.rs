#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sheet-grouped tabular output.
//!
//! A [`Workbook`] collects string records under named sheets and writes
//! them either as an `.xlsx` workbook ([`xlsx`]) or as one CSV file per
//! sheet ([`csv_io`]). Columns are the sorted union of every key seen in a
//! sheet, so records do not need to share a schema.

pub mod csv_io;
pub mod xlsx;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One row: column name to cell text.
pub type Record = BTreeMap<String, String>;

/// Errors raised by workbook operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    /// A sheet with this name already exists.
    #[error("Sheet '{0}' already exists")]
    SheetExists(String),

    /// No sheet has this name.
    #[error("Sheet '{0}' does not exist")]
    SheetNotFound(String),

    /// Removing the sheet would leave the workbook empty.
    #[error("Cannot remove the only remaining worksheet")]
    LastSheet,

    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the xlsx archive failed.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output format for [`Workbook::save`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WorkbookFormat {
    /// A single Office Open XML workbook.
    #[default]
    Xlsx,
    /// A directory holding one CSV file per sheet.
    Csv,
}

/// Styling applied to the header row of xlsx output.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HeaderStyle {
    /// Bold white text on a dark blue fill.
    #[default]
    Bold,
    Plain,
}

/// Accepts rows filed under a named sheet.
pub trait RowSink {
    /// Files `row` under `sheet`, creating the sheet if needed.
    fn add_row(&mut self, sheet: &str, row: Record);
}

/// A named list of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    name: String,
    rows: Vec<Record>,
}

impl Sheet {
    /// Creates a sheet with the given rows.
    #[must_use]
    pub fn new(name: impl Into<String>, rows: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Sorted union of every column name used in this sheet.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(|r| r.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Values of one column, `None` where a row lacks it.
    #[must_use]
    pub fn column(&self, name: &str) -> Vec<Option<&str>> {
        self.rows
            .iter()
            .map(|r| r.get(name).map(String::as_str))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Row and column counts for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetStats {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Creates a workbook with no sheets.
    #[must_use]
    pub const fn new() -> Self {
        Self { sheets: Vec::new() }
    }

    /// Adds an empty sheet.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::SheetExists`] if the name is taken.
    pub fn create_sheet(&mut self, name: &str) -> Result<(), WorkbookError> {
        if self.sheet_exists(name) {
            return Err(WorkbookError::SheetExists(name.to_owned()));
        }
        self.sheets.push(Sheet::new(name, Vec::new()));
        Ok(())
    }

    /// Adds a fully built sheet.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::SheetExists`] if the name is taken.
    pub fn insert_sheet(&mut self, sheet: Sheet) -> Result<(), WorkbookError> {
        if self.sheet_exists(sheet.name()) {
            return Err(WorkbookError::SheetExists(sheet.name));
        }
        self.sheets.push(sheet);
        Ok(())
    }

    /// Removes a sheet.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError::SheetNotFound`] for an unknown name, or
    /// [`WorkbookError::LastSheet`] if it is the only sheet left.
    pub fn remove_sheet(&mut self, name: &str) -> Result<Sheet, WorkbookError> {
        let idx = self
            .sheets
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| WorkbookError::SheetNotFound(name.to_owned()))?;
        if self.sheets.len() <= 1 {
            return Err(WorkbookError::LastSheet);
        }
        Ok(self.sheets.remove(idx))
    }

    #[must_use]
    pub fn sheet_exists(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheet names in creation order.
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    #[must_use]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Total rows across every sheet.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(Sheet::len).sum()
    }

    /// Row and column counts per sheet.
    #[must_use]
    pub fn stats(&self) -> Vec<SheetStats> {
        self.sheets
            .iter()
            .map(|s| SheetStats {
                name: s.name.clone(),
                rows: s.len(),
                columns: s.headers().len(),
            })
            .collect()
    }

    /// Writes the workbook to `path` in the given format.
    ///
    /// For [`WorkbookFormat::Csv`], `path` is a directory that receives one
    /// file per sheet. Returns the paths written.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError`] if serialization or file I/O fails.
    pub fn save(
        &self,
        path: &Path,
        format: WorkbookFormat,
        header_style: HeaderStyle,
    ) -> Result<Vec<PathBuf>, WorkbookError> {
        let written = match format {
            WorkbookFormat::Xlsx => {
                xlsx::write_workbook(self, path, header_style)?;
                vec![path.to_path_buf()]
            }
            WorkbookFormat::Csv => csv_io::write_dir(self, path)?,
        };

        log::info!(
            "Saved {} sheet(s), {} row(s) as {format} to {}",
            self.sheets.len(),
            self.total_rows(),
            path.display()
        );

        Ok(written)
    }
}

impl RowSink for Workbook {
    fn add_row(&mut self, sheet: &str, row: Record) {
        if let Some(existing) = self.sheets.iter_mut().find(|s| s.name == sheet) {
            existing.rows.push(row);
        } else {
            self.sheets.push(Sheet::new(sheet, vec![row]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn add_row_creates_sheets_in_order() {
        let mut wb = Workbook::new();
        wb.add_row("North", record(&[("day", "Sat")]));
        wb.add_row("Central", record(&[("day", "Sun")]));
        wb.add_row("North", record(&[("day", "Mon"), ("cost", "$5")]));

        assert_eq!(wb.sheet_names(), vec!["North", "Central"]);
        assert_eq!(wb.total_rows(), 3);

        let north = wb.sheet("North").unwrap();
        assert_eq!(north.headers(), vec!["cost", "day"]);
        assert_eq!(north.column("cost"), vec![None, Some("$5")]);
    }

    #[test]
    fn duplicate_sheet_is_rejected() {
        let mut wb = Workbook::new();
        wb.create_sheet("A").unwrap();
        assert!(matches!(
            wb.create_sheet("A"),
            Err(WorkbookError::SheetExists(name)) if name == "A"
        ));
    }

    #[test]
    fn cannot_remove_last_or_unknown_sheet() {
        let mut wb = Workbook::new();
        wb.create_sheet("A").unwrap();
        assert!(matches!(wb.remove_sheet("B"), Err(WorkbookError::SheetNotFound(_))));
        assert!(matches!(wb.remove_sheet("A"), Err(WorkbookError::LastSheet)));

        wb.create_sheet("B").unwrap();
        let removed = wb.remove_sheet("A").unwrap();
        assert_eq!(removed.name(), "A");
        assert_eq!(wb.sheet_names(), vec!["B"]);
    }

    #[test]
    fn stats_count_rows_and_columns() {
        let mut wb = Workbook::new();
        wb.add_row("A", record(&[("x", "1"), ("y", "2")]));
        wb.add_row("A", record(&[("z", "3")]));
        wb.create_sheet("Empty").unwrap();

        assert_eq!(
            wb.stats(),
            vec![
                SheetStats {
                    name: "A".to_owned(),
                    rows: 2,
                    columns: 3
                },
                SheetStats {
                    name: "Empty".to_owned(),
                    rows: 0,
                    columns: 0
                },
            ]
        );
    }

    #[test]
    fn formats_parse_from_config_strings() {
        assert_eq!("CSV".parse::<WorkbookFormat>().unwrap(), WorkbookFormat::Csv);
        assert_eq!("plain".parse::<HeaderStyle>().unwrap(), HeaderStyle::Plain);
    }
}
