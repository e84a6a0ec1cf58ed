#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Permit text extraction.
//!
//! Two pure stages turn decoded permit text into spreadsheet rows:
//!
//! - [`extract`] scans the text line by line and groups date/time slot
//!   lines under the field header that precedes them.
//! - [`row::parse_row`] splits one slot line into day, date, start, end
//!   and cost columns.
//!
//! Neither stage performs I/O. Loading documents and writing workbooks
//! live in `field_permits_document` and `field_permits_workbook`.

pub mod extract;
pub mod row;

pub use extract::{ExtractError, extract, extract_slots};
pub use field_permits_permit_models::{
    ClockConversion, ExtractOptions, ExtractionResult, FieldSlotIndex, FieldSlots,
    OrphanSlotPolicy, ParsedRow, RowOptions, facility_name,
};
pub use row::{RowError, parse_row, parse_row_with};
