//! PDF text extraction.
//!
//! Thin wrappers over [`pdf_extract`] that work on in-memory bytes so the
//! caller owns all file I/O.

use crate::DocumentError;

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Whether `header` starts with the PDF magic bytes.
#[must_use]
pub fn has_pdf_magic(header: &[u8]) -> bool {
    header.starts_with(PDF_MAGIC)
}

/// Extracts the text of every page, in page order.
///
/// # Errors
///
/// Returns [`DocumentError::Extraction`] if the bytes are not a readable
/// PDF.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| DocumentError::Extraction(format!("failed to extract text from PDF: {e}")))?;

    log::debug!("Extracted {} page(s) of text from PDF", pages.len());

    Ok(pages)
}

/// Extracts the whole document as one string.
///
/// Pages whose text is blank are dropped; the rest are joined with a blank
/// line between them.
///
/// # Errors
///
/// Returns [`DocumentError::Extraction`] if the bytes are not a readable
/// PDF.
pub fn extract_text(bytes: &[u8]) -> Result<String, DocumentError> {
    Ok(join_pages(&extract_pages(bytes)?))
}

/// Joins page texts, skipping blank pages.
#[must_use]
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three pages: "Alpha Field permit", blank, "Bravo Field permit".
    const THREE_PAGES: &[u8] = include_bytes!("../fixtures/three_pages.pdf");

    #[test]
    fn extracts_one_entry_per_page() {
        let pages = extract_pages(THREE_PAGES).unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains("Alpha"));
        assert!(pages[1].trim().is_empty());
        assert!(pages[2].contains("Bravo"));
    }

    #[test]
    fn text_joins_non_blank_pages_in_order() {
        let text = extract_text(THREE_PAGES).unwrap();
        let alpha = text.find("Alpha").unwrap();
        let bravo = text.find("Bravo").unwrap();
        assert!(alpha < bravo);
        assert_eq!(text, join_pages(&extract_pages(THREE_PAGES).unwrap()));
    }

    #[test]
    fn garbage_bytes_are_an_extraction_error() {
        assert!(matches!(
            extract_text(b"not really"),
            Err(DocumentError::Extraction(_))
        ));
        assert!(matches!(
            extract_pages(b"not really"),
            Err(DocumentError::Extraction(_))
        ));
    }

    #[test]
    fn detects_magic_bytes() {
        assert!(has_pdf_magic(b"%PDF-1.7\n%\xe2\xe3"));
        assert!(!has_pdf_magic(b"PDF-1.7"));
        assert!(!has_pdf_magic(b""));
    }

    #[test]
    fn join_skips_blank_pages() {
        let pages = vec![
            "Page one".to_owned(),
            "   \n ".to_owned(),
            "Page three".to_owned(),
        ];
        assert_eq!(join_pages(&pages), "Page one\n\nPage three");
    }
}
