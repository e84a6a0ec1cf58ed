#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for permit slot extraction.
//!
//! This crate contains only data types, option structs, and simple
//! conversions. It has no regex engine and performs no I/O, so every other
//! crate in the workspace can depend on it cheaply.

use std::collections::BTreeMap;

use serde::ser::SerializeMap as _;
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Literal suffix that marks a line as a bookable field header.
pub const FIELD_USE_MARKER: &str = "(Athletic Field Use)";

/// Default cap on the number of slots and field names kept per document.
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// What to do with a slot line that appears before any field header.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrphanSlotPolicy {
    /// Keep the slot in the flat list but leave it out of the field index.
    #[default]
    Drop,
    /// Abort extraction with an error naming the offending line.
    Error,
}

/// How 12-hour clock times are mapped onto a 24-hour clock.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ClockConversion {
    /// `12 PM` stays `12:MM` and `12 AM` becomes `00:MM`.
    #[default]
    Corrected,
    /// Adds 12 to every PM hour and leaves every AM hour alone, so
    /// `12 PM` becomes `24:MM` and `12 AM` stays `12:MM`. Matches
    /// spreadsheets produced by earlier exports.
    Legacy,
}

/// Options for a single extraction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Cap applied independently to slot lines and field names.
    pub max_length: usize,
    /// Handling for slot lines seen before the first field header.
    pub orphan_slots: OrphanSlotPolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            orphan_slots: OrphanSlotPolicy::default(),
        }
    }
}

impl ExtractOptions {
    /// Creates options with the given cap and the default orphan policy.
    #[must_use]
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            ..Self::default()
        }
    }

    /// Sets the orphan slot policy.
    #[must_use]
    pub const fn orphan_slots(mut self, policy: OrphanSlotPolicy) -> Self {
        self.orphan_slots = policy;
        self
    }
}

/// Options for parsing slot lines into rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowOptions {
    /// 12-to-24 hour conversion rule.
    pub clock: ClockConversion,
}

/// The slot lines recorded under one field header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSlots {
    /// Header line exactly as it appeared (trimmed), marker included.
    pub name: String,
    /// Slot lines in source order.
    pub slots: Vec<String>,
}

impl FieldSlots {
    /// The header with the field-use marker (and anything after it)
    /// removed.
    #[must_use]
    pub fn facility_name(&self) -> &str {
        facility_name(&self.name)
    }
}

/// Ordered map from field header to its slot lines.
///
/// Keys keep first-appearance order. Registering a key that already exists
/// clears its slot list without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSlotIndex {
    entries: Vec<FieldSlots>,
}

impl FieldSlotIndex {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `name` with an empty slot list.
    pub fn register(&mut self, name: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.slots.clear();
        } else {
            self.entries.push(FieldSlots {
                name: name.to_owned(),
                slots: Vec::new(),
            });
        }
    }

    /// Appends `slot` under `name`. Returns `false` if `name` was never
    /// registered.
    pub fn push_slot(&mut self, name: &str, slot: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.slots.push(slot.to_owned());
                true
            }
            None => false,
        }
    }

    /// Slot lines recorded under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.slots.as_slice())
    }

    /// Header keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Iterates over every field and its slots in order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldSlots> {
        self.entries.iter()
    }

    /// Number of registered fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field has been registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldSlotIndex {
    type Item = &'a FieldSlots;
    type IntoIter = std::slice::Iter<'a, FieldSlots>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for FieldSlotIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.slots)?;
        }
        map.end()
    }
}

/// Everything one extraction pass found in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Every accepted slot line, in source order.
    pub date_time_slots: Vec<String>,
    /// Every accepted field header, in source order.
    pub field_names: Vec<String>,
    /// Slot lines grouped under the header that preceded them.
    pub field_date_time_slots: FieldSlotIndex,
}

/// One slot line split into spreadsheet columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRow {
    pub day: String,
    pub date: String,
    pub start: String,
    pub end: String,
    pub cost: String,
    #[serde(rename = "issued-date")]
    pub issued_date: String,
}

impl ParsedRow {
    /// Column headers in the order [`Self::values`] yields them.
    pub const COLUMNS: [&'static str; 6] = ["day", "date", "start", "end", "cost", "issued-date"];

    /// Cell values aligned with [`Self::COLUMNS`].
    #[must_use]
    pub fn values(&self) -> [&str; 6] {
        [
            &self.day,
            &self.date,
            &self.start,
            &self.end,
            &self.cost,
            &self.issued_date,
        ]
    }

    /// Converts the row into a column-name keyed record.
    #[must_use]
    pub fn into_record(self) -> BTreeMap<String, String> {
        Self::COLUMNS
            .iter()
            .zip(self.values())
            .map(|(column, value)| ((*column).to_owned(), value.to_owned()))
            .collect()
    }
}

/// Strips the field-use marker, and anything after it, from a header.
///
/// `"Shoreline North Field (Athletic Field Use) #2"` becomes
/// `"Shoreline North Field"`. Headers without the marker are only trimmed.
#[must_use]
pub fn facility_name(header: &str) -> &str {
    header
        .find(FIELD_USE_MARKER)
        .map_or(header, |idx| &header[..idx])
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facility_name_drops_marker_and_suffix() {
        assert_eq!(
            facility_name("Shoreline North Field (Athletic Field Use) #2"),
            "Shoreline North Field"
        );
        assert_eq!(facility_name("  Main Gym  "), "Main Gym");
    }

    #[test]
    fn re_registering_resets_slots_in_place() {
        let mut index = FieldSlotIndex::new();
        index.register("A (Athletic Field Use)");
        index.register("B (Athletic Field Use)");
        assert!(index.push_slot("A (Athletic Field Use)", "slot 1"));
        index.register("A (Athletic Field Use)");

        let keys: Vec<&str> = index.keys().collect();
        assert_eq!(keys, vec!["A (Athletic Field Use)", "B (Athletic Field Use)"]);
        assert_eq!(index.get("A (Athletic Field Use)"), Some(&[][..]));
    }

    #[test]
    fn push_to_unknown_field_is_rejected() {
        let mut index = FieldSlotIndex::new();
        assert!(!index.push_slot("missing", "slot"));
        assert!(index.is_empty());
    }

    #[test]
    fn index_serializes_as_ordered_map() {
        let mut index = FieldSlotIndex::new();
        index.register("Zeta Field (Athletic Field Use)");
        index.register("Alpha Field (Athletic Field Use)");
        index.push_slot("Zeta Field (Athletic Field Use)", "s1");

        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(
            json,
            r#"{"Zeta Field (Athletic Field Use)":["s1"],"Alpha Field (Athletic Field Use)":[]}"#
        );
    }

    #[test]
    fn parsed_row_uses_hyphenated_issued_date_column() {
        let row = ParsedRow {
            day: "Sat".to_owned(),
            date: "Dec 6, 2025".to_owned(),
            start: "8:00".to_owned(),
            end: "13:00".to_owned(),
            cost: "$25".to_owned(),
            issued_date: "2025-11-01".to_owned(),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["issued-date"], "2025-11-01");

        assert_eq!(row.values()[1], "Dec 6, 2025");

        let record = row.into_record();
        assert_eq!(record["issued-date"], "2025-11-01");
        assert_eq!(record["end"], "13:00");
        assert_eq!(record.len(), ParsedRow::COLUMNS.len());
    }

    #[test]
    fn policies_parse_case_insensitively() {
        assert_eq!("ERROR".parse::<OrphanSlotPolicy>().unwrap(), OrphanSlotPolicy::Error);
        assert_eq!("legacy".parse::<ClockConversion>().unwrap(), ClockConversion::Legacy);
        assert_eq!(ClockConversion::Corrected.to_string(), "corrected");
    }
}
