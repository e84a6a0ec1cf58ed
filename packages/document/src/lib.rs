#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Permit document loading.
//!
//! Permits arrive either as plain-text exports or as PDFs. This crate hides
//! the difference behind the [`DocumentLoader`] trait: callers ask for the
//! decoded text of a path and get a single string back, regardless of
//! format. PDF text comes from [`pdf_extract`].
//!
//! [`FileLoader`] is the filesystem implementation. It is constructed once
//! and passed by reference to whatever needs to read documents.

pub mod discover;
pub mod pdf;

use std::io::Read as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

pub use discover::{NamePattern, PERMIT_PATTERNS};

/// Errors raised while loading a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The path does not exist or is not a file.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Text,
}

/// File metadata for a document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    /// Absolute, resolved path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, when the platform reports one.
    pub modified: Option<DateTime<Utc>>,
    pub kind: DocumentKind,
    /// Page count for PDFs. `None` for text files, or when the PDF could
    /// not be parsed.
    pub pages: Option<usize>,
}

/// Yields decoded text for documents.
pub trait DocumentLoader {
    /// Returns the full decoded text of the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the document cannot be read or decoded.
    fn read_text(&self, path: &Path) -> Result<String, DocumentError>;

    /// Returns the decoded text of each page. Documents without pages
    /// return a single entry.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the document cannot be read or decoded.
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, DocumentError>;

    /// Returns file metadata.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if the path does not exist.
    fn info(&self, path: &Path) -> Result<DocumentInfo, DocumentError>;
}

/// Loads documents from the filesystem, resolving relative paths against a
/// base directory.
#[derive(Debug, Clone)]
pub struct FileLoader {
    base_path: PathBuf,
}

impl FileLoader {
    /// Creates a loader that resolves relative paths against `base_path`.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Creates a loader rooted at the current working directory.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Io`] if the working directory is
    /// unavailable.
    pub fn from_current_dir() -> Result<Self, DocumentError> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// The directory relative paths resolve against.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Joins relative paths onto the base path.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    fn existing_file(&self, path: &Path) -> Result<PathBuf, DocumentError> {
        let resolved = self.resolve(path);
        if resolved.is_file() {
            Ok(resolved.canonicalize().unwrap_or(resolved))
        } else {
            Err(DocumentError::NotFound(resolved))
        }
    }

    /// Whether the document is a PDF, judged by a `.pdf` extension or by
    /// the `%PDF-` magic bytes.
    #[must_use]
    pub fn is_pdf(&self, path: &Path) -> bool {
        let resolved = self.resolve(path);
        if !resolved.is_file() {
            return false;
        }

        if resolved
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        {
            return true;
        }

        let mut header = [0_u8; 8];
        std::fs::File::open(&resolved)
            .and_then(|mut f| f.read(&mut header))
            .is_ok_and(|n| pdf::has_pdf_magic(&header[..n]))
    }

    /// Returns the document as lines: one entry per line for text files,
    /// one entry per page for PDFs.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the document cannot be read.
    pub fn read_lines(&self, path: &Path) -> Result<Vec<String>, DocumentError> {
        if self.is_pdf(path) {
            return self.read_pages(path);
        }
        Ok(self
            .read_text(path)?
            .lines()
            .map(str::to_owned)
            .collect())
    }

    /// Finds candidate permit files directly inside `dir` (relative paths
    /// resolve against the base path).
    #[must_use]
    pub fn find_permit_files(&self, dir: &Path) -> Vec<PathBuf> {
        let dir = self.resolve(dir);
        let found = discover::find_files(&dir, PERMIT_PATTERNS);
        log::info!("Found {} potential permit files in {}", found.len(), dir.display());
        found
    }

    fn read_plain(path: &Path) -> Result<String, DocumentError> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8(bytes).unwrap_or_else(|e| {
            log::warn!(
                "{} is not valid UTF-8; replacing invalid sequences",
                path.display()
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }))
    }
}

impl DocumentLoader for FileLoader {
    fn read_text(&self, path: &Path) -> Result<String, DocumentError> {
        let resolved = self.existing_file(path)?;
        log::debug!("Reading {}", resolved.display());

        if self.is_pdf(&resolved) {
            let bytes = std::fs::read(&resolved)?;
            return pdf::extract_text(&bytes);
        }

        Self::read_plain(&resolved)
    }

    fn read_pages(&self, path: &Path) -> Result<Vec<String>, DocumentError> {
        let resolved = self.existing_file(path)?;

        if self.is_pdf(&resolved) {
            let bytes = std::fs::read(&resolved)?;
            return pdf::extract_pages(&bytes);
        }

        Ok(vec![Self::read_plain(&resolved)?])
    }

    fn info(&self, path: &Path) -> Result<DocumentInfo, DocumentError> {
        let resolved = self.existing_file(path)?;
        let meta = std::fs::metadata(&resolved)?;
        let modified = meta.modified().ok().map(DateTime::<Utc>::from);

        let (kind, pages) = if self.is_pdf(&resolved) {
            let pages = std::fs::read(&resolved)
                .map_err(DocumentError::from)
                .and_then(|bytes| pdf::extract_pages(&bytes))
                .map(|p| p.len())
                .map_err(|e| log::warn!("Cannot count pages of {}: {e}", resolved.display()))
                .ok();
            (DocumentKind::Pdf, pages)
        } else {
            (DocumentKind::Text, None)
        };

        Ok(DocumentInfo {
            path: resolved,
            size: meta.len(),
            modified,
            kind,
            pages,
        })
    }
}
