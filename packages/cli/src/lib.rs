#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Support code for the `field_permits` binary: layered configuration
//! and plain-text rendering of command results.

pub mod config;
pub mod render;

use std::path::{Path, PathBuf};

use field_permits_workbook::WorkbookFormat;

/// Default export destination: `<stem>.xlsx` next to the input, or a
/// `<stem>_sheets` directory for CSV output.
#[must_use]
pub fn default_output_path(input: &Path, format: WorkbookFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "permit".to_owned(), |s| s.to_string_lossy().into_owned());
    let name = match format {
        WorkbookFormat::Xlsx => format!("{stem}.xlsx"),
        WorkbookFormat::Csv => format!("{stem}_sheets"),
    };
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_sits_beside_input() {
        assert_eq!(
            default_output_path(Path::new("docs/permit.pdf"), WorkbookFormat::Xlsx),
            PathBuf::from("docs/permit.xlsx")
        );
        assert_eq!(
            default_output_path(Path::new("permit.txt"), WorkbookFormat::Csv),
            PathBuf::from("permit_sheets")
        );
    }
}
