//! Line classification and slot grouping.
//!
//! Each trimmed line of a permit is tested against two anchored patterns:
//! a run of one or more `Sat, Dec 6, 2025 8:00 AM` style timestamps, and a
//! facility header ending in `(Athletic Field Use)`. Slot lines are filed
//! under the most recent header. Everything else is noise.

use std::convert::Infallible;
use std::sync::LazyLock;

use field_permits_permit_models::{
    ExtractOptions, ExtractionResult, FIELD_USE_MARKER, FieldSlotIndex, OrphanSlotPolicy,
};
use regex::Regex;

/// One or more chained timestamps followed by at least one whitespace
/// character.
static SLOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z]{3}, [A-Za-z]{3} \d{1,2}, \d{4} \d{1,2}:\d{2} (?:AM|PM)(?: [A-Za-z]{3}, [A-Za-z]{3} \d{1,2}, \d{4} \d{1,2}:\d{2} (?:AM|PM))*\s",
    )
    .expect("valid regex")
});

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^[A-Za-z\s]+ {}", regex::escape(FIELD_USE_MARKER)))
        .expect("valid regex")
});

/// Errors raised while extracting slots.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// A slot line appeared before any field header and the options ask
    /// for a hard failure.
    #[error("slot on line {line_number} has no preceding field header: {line}")]
    OrphanSlot {
        /// 1-based line number in the source text.
        line_number: usize,
        /// The trimmed slot line.
        line: String,
    },
}

/// Classification of a single trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Slot,
    FieldName,
    Noise,
}

fn classify(line: &str) -> LineKind {
    if SLOT_RE.is_match(line) {
        LineKind::Slot
    } else if FIELD_RE.is_match(line) {
        LineKind::FieldName
    } else {
        LineKind::Noise
    }
}

/// Whether `line` (already trimmed) is a date/time slot line.
#[must_use]
pub fn is_slot_line(line: &str) -> bool {
    classify(line) == LineKind::Slot
}

/// Whether `line` (already trimmed) is a field header line.
#[must_use]
pub fn is_field_name_line(line: &str) -> bool {
    classify(line) == LineKind::FieldName
}

/// Extracts slot lines and field headers from `text`.
///
/// Lines are split on `\n` and trimmed; blank lines are skipped. Slot
/// lines and field names are each capped at `options.max_length`
/// independently. A slot over the cap is not recorded anywhere, and a
/// header over the cap neither registers a key nor becomes the current
/// field.
///
/// # Errors
///
/// Returns [`ExtractError::OrphanSlot`] when a slot line precedes every
/// field header and `options.orphan_slots` is [`OrphanSlotPolicy::Error`].
pub fn extract(text: &str, options: &ExtractOptions) -> Result<ExtractionResult, ExtractError> {
    match options.orphan_slots {
        OrphanSlotPolicy::Drop => {
            let Ok(result) = scan::<Infallible>(text, options.max_length, warn_orphan);
            Ok(result)
        }
        OrphanSlotPolicy::Error => scan(text, options.max_length, |line_number, line| {
            Err(ExtractError::OrphanSlot {
                line_number,
                line: line.to_owned(),
            })
        }),
    }
}

/// Extracts with the default orphan policy ([`OrphanSlotPolicy::Drop`]),
/// which cannot fail.
#[must_use]
pub fn extract_slots(text: &str, max_length: usize) -> ExtractionResult {
    let Ok(result) = scan::<Infallible>(text, max_length, warn_orphan);
    result
}

fn warn_orphan(line_number: usize, _line: &str) -> Result<(), Infallible> {
    log::warn!("Slot on line {line_number} precedes any field header; not indexed");
    Ok(())
}

/// Line loop shared by every orphan policy. `on_orphan` sees the 1-based
/// line number and the trimmed line of each slot that has no header yet;
/// returning `Ok` keeps the slot in the flat list only.
fn scan<E>(
    text: &str,
    max_length: usize,
    mut on_orphan: impl FnMut(usize, &str) -> Result<(), E>,
) -> Result<ExtractionResult, E> {
    let mut result = ExtractionResult {
        date_time_slots: Vec::new(),
        field_names: Vec::new(),
        field_date_time_slots: FieldSlotIndex::new(),
    };
    let mut current: Option<&str> = None;

    for (idx, raw) in text.split('\n').enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        log::trace!("Processing line {}: {line}", idx + 1);

        match classify(line) {
            LineKind::Slot => {
                if result.date_time_slots.len() >= max_length {
                    continue;
                }
                if let Some(name) = current {
                    result.field_date_time_slots.push_slot(name, line);
                } else {
                    on_orphan(idx + 1, line)?;
                }
                result.date_time_slots.push(line.to_owned());
            }
            LineKind::FieldName => {
                if result.field_names.len() >= max_length {
                    continue;
                }
                result.field_names.push(line.to_owned());
                result.field_date_time_slots.register(line);
                current = Some(line);
            }
            LineKind::Noise => {}
        }
    }

    log::debug!(
        "Found {} date/time slots and {} field names",
        result.date_time_slots.len(),
        result.field_names.len()
    );

    Ok(result)
}
