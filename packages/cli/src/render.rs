//! Plain-text rendering of command results.

use std::fmt::Write as _;

use field_permits_summarize::PermitSummary;
use field_permits_summarize::export::ExportReport;
use field_permits_workbook::SheetStats;

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Formats `n` with `,` thousands separators.
#[must_use]
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Numbers lines from 1, right-aligned to four columns. `limit` keeps the
/// first `limit` lines when positive.
#[must_use]
pub fn numbered_lines(lines: &[String], limit: Option<usize>) -> String {
    let shown = match limit {
        Some(n) if n > 0 => &lines[..n.min(lines.len())],
        _ => lines,
    };

    let mut out = String::new();
    for (i, line) in shown.iter().enumerate() {
        let _ = writeln!(out, "{:4}: {}", i + 1, line.trim_end());
    }
    out
}

/// Human-readable report for one summary.
#[must_use]
pub fn summary(summary: &PermitSummary) -> String {
    let mut out = String::new();
    let extraction = &summary.extraction;

    let _ = writeln!(out, "File: {}", summary.source);
    let _ = writeln!(out, "Type: {}", summary.file_type.as_ref().to_uppercase());
    if summary.pages > 1 {
        let _ = writeln!(out, "Pages: {}", summary.pages);
    }
    let _ = writeln!(out, "Words: {}", thousands(summary.word_count));
    let _ = writeln!(out, "Characters: {}", thousands(summary.character_count));
    out.push('\n');

    if !extraction.date_time_slots.is_empty() {
        let _ = writeln!(out, "Available Time Slots:\n{}", rule());
        for (i, slot) in extraction.date_time_slots.iter().enumerate() {
            let _ = writeln!(out, "{:2}. {slot}", i + 1);
        }
        out.push('\n');
    }

    if !extraction.field_names.is_empty() {
        let _ = writeln!(out, "Available Fields:\n{}", rule());
        for (i, field) in extraction.field_names.iter().enumerate() {
            let _ = writeln!(out, "{:2}. {field}", i + 1);
        }
        out.push('\n');
    }

    if extraction.field_date_time_slots.iter().any(|f| !f.slots.is_empty()) {
        let _ = writeln!(out, "Field-Specific Time Slots:\n{}", rule());
        for field in extraction
            .field_date_time_slots
            .iter()
            .filter(|f| !f.slots.is_empty())
        {
            let _ = writeln!(out, "{}:", field.name);
            for (i, slot) in field.slots.iter().enumerate() {
                let _ = writeln!(out, "   {}. {slot}", i + 1);
            }
            out.push('\n');
        }
    }

    let _ = writeln!(out, "Preview:\n{}\n{}", rule(), summary.preview);
    out
}

/// Report for a finished export.
#[must_use]
pub fn export(report: &ExportReport, stats: &[SheetStats]) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Wrote {} row(s) across {} sheet(s)",
        thousands(report.rows_written),
        report.sheets.len()
    );
    for sheet in stats {
        let _ = writeln!(out, "  {:<40} {:>6} row(s)", sheet.name, sheet.rows);
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped {} row(s):", report.skipped.len());
        for skipped in &report.skipped {
            let _ = writeln!(out, "  [{}] {}: {}", skipped.field, skipped.line, skipped.error);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use field_permits_permit::ExtractOptions;

    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn numbers_and_limits_lines() {
        let lines: Vec<String> = ["a  ", "b", "c"].iter().map(|s| (*s).to_owned()).collect();
        assert_eq!(numbered_lines(&lines, Some(2)), "   1: a\n   2: b\n");
        assert_eq!(numbered_lines(&lines, Some(0)).lines().count(), 3);
        assert_eq!(numbered_lines(&lines, Some(10)).lines().count(), 3);
    }

    #[test]
    fn summary_lists_slots_under_fields() {
        let text = "\
North Field (Athletic Field Use)
Sat, Dec 6, 2025 8:00 AM Sat, Dec 6, 2025 1:00 PM $25
Empty Field (Athletic Field Use)
";
        let s = field_permits_summarize::summarize_text(text, "inline", &ExtractOptions::default())
            .unwrap();
        let out = summary(&s);

        assert!(out.starts_with("File: inline\nType: TEXT\n"));
        assert!(out.contains(" 1. Sat, Dec 6, 2025 8:00 AM"));
        assert!(out.contains("North Field (Athletic Field Use):\n   1. Sat"));
        assert!(!out.contains("Empty Field (Athletic Field Use):"));
    }
}
