//! Positional parsing of a single slot line.
//!
//! A slot line such as
//!
//! ```text
//! Sat, Dec 6, 2025 8:00 AM Sat, Dec 6, 2025 1:00 PM $25
//! ```
//!
//! splits on `,` into five elements:
//!
//! | idx | content            |
//! |-----|--------------------|
//! | 0   | `Sat`              |
//! | 1   | ` Dec 6`           |
//! | 2   | ` 2025 8:00 AM Sat`|
//! | 3   | ` Dec 6`           |
//! | 4   | ` 2025 1:00 PM $25`|
//!
//! Lines that put a comma between the start period and the end weekday
//! carry the end weekday alone in element 3; it is folded back into
//! element 2. Commas inside the cost (`$1,000`) spill past element 4 and
//! are glued back onto it.

use field_permits_permit_models::{ClockConversion, ParsedRow, RowOptions};

/// Structural failures while parsing a slot line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// The line has fewer comma-separated elements than the layout needs.
    #[error("expected at least 5 comma-separated elements, found {found}: {line}")]
    MissingElement {
        /// Number of elements present.
        found: usize,
        /// The offending line.
        line: String,
    },

    /// A timestamp fragment is missing a whitespace-separated token.
    #[error("fragment '{fragment}' has no {token} token")]
    MissingToken {
        /// The fragment being tokenized.
        fragment: String,
        /// Which token was expected (`year`, `time`, `period`, `cost`).
        token: &'static str,
    },

    /// The clock token is not `H:MM` with a numeric hour.
    #[error("invalid clock time '{0}'")]
    InvalidTime(String),
}

/// Parses a slot line with default [`RowOptions`].
///
/// # Errors
///
/// Returns [`RowError`] if the line does not have the expected positional
/// layout.
pub fn parse_row(line: &str, issued_date: &str) -> Result<ParsedRow, RowError> {
    parse_row_with(line, issued_date, &RowOptions::default())
}

/// Parses a slot line into a [`ParsedRow`].
///
/// `issued_date` is copied into the row verbatim.
///
/// # Errors
///
/// Returns [`RowError`] if the line has fewer than five comma-separated
/// elements, a timestamp fragment is short a token, or an hour is not
/// numeric.
pub fn parse_row_with(
    line: &str,
    issued_date: &str,
    options: &RowOptions,
) -> Result<ParsedRow, RowError> {
    let elements = split_elements(line)?;

    let day = elements[0].trim().to_owned();
    let date = extract_date(&elements[1], &elements[2])?;
    let start = extract_time(&elements[2], options.clock)?;
    let end = extract_time(&elements[4], options.clock)?;
    let cost = extract_cost(&elements[4])?;

    Ok(ParsedRow {
        day,
        date,
        start,
        end,
        cost,
        issued_date: issued_date.to_owned(),
    })
}

fn split_elements(line: &str) -> Result<Vec<String>, RowError> {
    let mut elements: Vec<String> = line.split(',').map(str::to_owned).collect();

    if elements.len() < 5 {
        return Err(RowError::MissingElement {
            found: elements.len(),
            line: line.to_owned(),
        });
    }

    if elements.len() > 5 && is_weekday(&elements[3]) {
        let end_day = elements.remove(3);
        elements[2].push_str(&end_day);
    }

    if elements.len() > 5 {
        let cost_tail = elements.split_off(5);
        let last = &mut elements[4];
        for part in cost_tail {
            last.push(',');
            last.push_str(&part);
        }
    }

    Ok(elements)
}

/// `" Sat"` but not `" Dec 6"`.
fn is_weekday(element: &str) -> bool {
    let element = element.trim();
    element.len() == 3 && element.chars().all(|c| c.is_ascii_alphabetic())
}

fn token<'a>(fragment: &'a str, idx: usize, name: &'static str) -> Result<&'a str, RowError> {
    fragment
        .split_whitespace()
        .nth(idx)
        .ok_or_else(|| RowError::MissingToken {
            fragment: fragment.to_owned(),
            token: name,
        })
}

/// `" Dec 6"` + `" 2025 8:00 AM Sat"` → `"Dec 6, 2025"`.
fn extract_date(month_day: &str, year_time: &str) -> Result<String, RowError> {
    let year = token(year_time, 0, "year")?;
    Ok(format!("{}, {year}", month_day.trim()))
}

/// `" 2025 1:00 PM $25"` → `"13:00"`.
fn extract_time(fragment: &str, clock: ClockConversion) -> Result<String, RowError> {
    let time = token(fragment, 1, "time")?;
    let period = token(fragment, 2, "period")?;
    to_24_hour(time, period, clock)
}

/// `" 2025 1:00 PM $25"` → `"$25"`.
fn extract_cost(fragment: &str) -> Result<String, RowError> {
    token(fragment, 3, "cost").map(str::to_owned)
}

fn to_24_hour(time: &str, period: &str, clock: ClockConversion) -> Result<String, RowError> {
    let (hour, minute) = time
        .split_once(':')
        .ok_or_else(|| RowError::InvalidTime(time.to_owned()))?;
    let hour: u32 = hour
        .parse()
        .map_err(|_| RowError::InvalidTime(time.to_owned()))?;
    let pm = period == "PM";

    let converted = match clock {
        ClockConversion::Legacy => {
            if !pm {
                return Ok(time.to_owned());
            }
            format!("{}:{minute}", hour + 12)
        }
        ClockConversion::Corrected => match (hour, pm) {
            (12, false) => format!("00:{minute}"),
            (12, true) => time.to_owned(),
            (_, true) => format!("{}:{minute}", hour + 12),
            (_, false) => time.to_owned(),
        },
    };

    Ok(converted)
}
