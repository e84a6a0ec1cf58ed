//! Minimal Office Open XML (`.xlsx`) writer.
//!
//! Every cell is written as an inline string, which is all the permit
//! exports need. The archive holds the content-types manifest, package and
//! workbook relationships, a stylesheet with one header style, and one
//! worksheet part per sheet.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use crate::{HeaderStyle, Sheet, Workbook, WorkbookError};

/// Excel rejects sheet titles longer than this.
pub const MAX_SHEET_TITLE: usize = 31;

/// Upper bound on auto-sized column widths.
const MAX_COLUMN_WIDTH: usize = 50;

const CONTENT_TYPES_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><color rgb="FFFFFFFF"/><name val="Calibri"/></font></fonts><fills count="3"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor rgb="FF366092"/><bgColor indexed="64"/></patternFill></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Escapes text for XML element content and attribute values.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 forbids most control characters.
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

/// Spreadsheet column letters for a 0-based index (`0` → `A`, `26` → `AA`).
#[must_use]
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Makes `name` a legal, unique sheet title.
///
/// Strips `[ ] : * ? / \`, caps the length at [`MAX_SHEET_TITLE`], and
/// appends ` (n)` on case-insensitive collisions with `used`.
pub fn sheet_title(name: &str, used: &mut BTreeSet<String>) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    let base: String = if cleaned.is_empty() {
        "Sheet".to_owned()
    } else {
        cleaned.chars().take(MAX_SHEET_TITLE).collect()
    };

    let mut title = base.clone();
    let mut n = 2;
    while !used.insert(title.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = MAX_SHEET_TITLE.saturating_sub(suffix.chars().count());
        title = base.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }
    title
}

fn column_widths(headers: &[String], sheet: &Sheet) -> Vec<usize> {
    headers
        .iter()
        .map(|h| {
            let longest = sheet
                .rows()
                .iter()
                .filter_map(|r| r.get(h))
                .map(|v| v.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

fn push_cell(xml: &mut String, col: usize, row: usize, value: &str, style: Option<u8>) {
    if value.is_empty() {
        return;
    }
    let style_attr = style.map_or_else(String::new, |s| format!(r#" s="{s}""#));
    let space = if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace)
    {
        r#" xml:space="preserve""#
    } else {
        ""
    };
    let _ = write!(
        xml,
        r#"<c r="{}{row}" t="inlineStr"{style_attr}><is><t{space}>{}</t></is></c>"#,
        column_letter(col),
        escape_xml(value)
    );
}

/// Renders one worksheet part.
#[must_use]
pub fn worksheet_xml(sheet: &Sheet, header_style: HeaderStyle) -> String {
    let headers = sheet.headers();
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    if !headers.is_empty() {
        xml.push_str("<cols>");
        for (i, width) in column_widths(&headers, sheet).iter().enumerate() {
            let _ = write!(
                xml,
                r#"<col min="{n}" max="{n}" width="{width}" customWidth="1"/>"#,
                n = i + 1
            );
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");

    if !headers.is_empty() {
        let style = match header_style {
            HeaderStyle::Bold => Some(1),
            HeaderStyle::Plain => None,
        };
        xml.push_str(r#"<row r="1">"#);
        for (col, header) in headers.iter().enumerate() {
            push_cell(&mut xml, col, 1, header, style);
        }
        xml.push_str("</row>");

        for (i, record) in sheet.rows().iter().enumerate() {
            let row_num = i + 2;
            let _ = write!(xml, r#"<row r="{row_num}">"#);
            for (col, header) in headers.iter().enumerate() {
                let value = record.get(header).map_or("", String::as_str);
                push_cell(&mut xml, col, row_num, value, None);
            }
            xml.push_str("</row>");
        }
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Writes `workbook` as an `.xlsx` file at `path`, creating parent
/// directories. A workbook without sheets is written with one empty
/// `Sheet1`.
///
/// # Errors
///
/// Returns [`WorkbookError`] if the file or archive cannot be written.
pub fn write_workbook(
    workbook: &Workbook,
    path: &Path,
    header_style: HeaderStyle,
) -> Result<(), WorkbookError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let placeholder;
    let sheets: &[Sheet] = if workbook.sheets().is_empty() {
        placeholder = [Sheet::new("Sheet1", Vec::new())];
        &placeholder
    } else {
        workbook.sheets()
    };

    let mut used = BTreeSet::new();
    let titles: Vec<String> = sheets
        .iter()
        .map(|s| sheet_title(s.name(), &mut used))
        .collect();

    let mut content_types = String::from(CONTENT_TYPES_HEAD);
    let mut workbook_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut workbook_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for (i, title) in titles.iter().enumerate() {
        let n = i + 1;
        let _ = write!(
            content_types,
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
        let _ = write!(
            workbook_xml,
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape_xml(title)
        );
        let _ = write!(
            workbook_rels,
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        );
    }

    let styles_id = titles.len() + 1;
    let _ = write!(
        workbook_rels,
        r#"<Relationship Id="rId{styles_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
    );

    content_types.push_str("</Types>");
    workbook_xml.push_str("</sheets></workbook>");
    workbook_rels.push_str("</Relationships>");

    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);

    let mut part = |name: &str, body: &str| -> Result<(), WorkbookError> {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    part("[Content_Types].xml", &content_types)?;
    part("_rels/.rels", ROOT_RELS)?;
    part("xl/workbook.xml", &workbook_xml)?;
    part("xl/_rels/workbook.xml.rels", &workbook_rels)?;
    part("xl/styles.xml", STYLES)?;
    for (i, sheet) in sheets.iter().enumerate() {
        part(
            &format!("xl/worksheets/sheet{}.xml", i + 1),
            &worksheet_xml(sheet, header_style),
        )?;
    }

    zip.finish()?;
    Ok(())
}
