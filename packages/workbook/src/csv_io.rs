//! CSV serialization of sheets.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::{Record, Sheet, Workbook, WorkbookError};

/// Writes `sheet` as CSV with a header row.
///
/// An empty sheet produces an empty string.
///
/// # Errors
///
/// Returns [`WorkbookError::Csv`] if encoding fails.
pub fn to_csv_string(sheet: &Sheet, delimiter: u8) -> Result<String, WorkbookError> {
    if sheet.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    write_sheet(&mut writer, sheet)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| WorkbookError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_sheet<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    sheet: &Sheet,
) -> Result<(), WorkbookError> {
    let headers = sheet.headers();
    writer.write_record(&headers)?;
    for row in sheet.rows() {
        writer.write_record(headers.iter().map(|h| row.get(h).map_or("", String::as_str)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Turns a sheet name into a safe file stem.
#[must_use]
pub fn file_stem(sheet_name: &str) -> String {
    let stem: String = sheet_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if stem.is_empty() {
        "Sheet".to_owned()
    } else {
        stem
    }
}

/// Writes one `<sheet>.csv` file per sheet into `dir`, creating it if
/// needed.
///
/// # Errors
///
/// Returns [`WorkbookError`] if the directory or any file cannot be
/// written.
pub fn write_dir(workbook: &Workbook, dir: &Path) -> Result<Vec<PathBuf>, WorkbookError> {
    std::fs::create_dir_all(dir)?;

    let mut used = BTreeSet::new();
    let mut written = Vec::with_capacity(workbook.sheets().len());

    for sheet in workbook.sheets() {
        let base = file_stem(sheet.name());
        let mut stem = base.clone();
        let mut n = 2;
        while !used.insert(stem.to_lowercase()) {
            stem = format!("{base} ({n})");
            n += 1;
        }

        let path = dir.join(format!("{stem}.csv"));
        let mut writer = csv::Writer::from_path(&path)?;
        write_sheet(&mut writer, sheet)?;

        log::debug!("Wrote {} row(s) to {}", sheet.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

/// Reads a CSV file with a header row into a sheet.
///
/// # Errors
///
/// Returns [`WorkbookError`] if the file cannot be read or parsed.
pub fn read_file(path: &Path, sheet_name: &str) -> Result<Sheet, WorkbookError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Record = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_owned(), v.to_owned()))
            .collect();
        rows.push(row);
    }

    Ok(Sheet::new(sheet_name, rows))
}

impl Workbook {
    /// Loads a single-sheet workbook from a CSV file. The sheet is named
    /// after the file stem.
    ///
    /// # Errors
    ///
    /// Returns [`WorkbookError`] if the file cannot be read or parsed.
    pub fn from_csv_file(path: &Path) -> Result<Self, WorkbookError> {
        let name = path
            .file_stem()
            .map_or_else(|| "Sheet1".to_owned(), |s| s.to_string_lossy().into_owned());
        let mut workbook = Self::new();
        workbook.insert_sheet(read_file(path, &name)?)?;
        Ok(workbook)
    }
}
