//! Candidate permit file discovery.

use std::path::{Path, PathBuf};

/// A file-name pattern, equivalent to a single-level glob with one or two
/// `*` wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePattern {
    /// `*<suffix>`
    Suffix(&'static str),
    /// `*<needle>*`
    Contains(&'static str),
}

impl NamePattern {
    /// Whether `name` matches this pattern.
    #[must_use]
    pub fn matches(self, name: &str) -> bool {
        match self {
            Self::Suffix(suffix) => name.ends_with(suffix),
            Self::Contains(needle) => name.contains(needle),
        }
    }
}

/// Patterns searched for permit files, in priority order.
pub const PERMIT_PATTERNS: &[NamePattern] = &[
    NamePattern::Suffix(".pdf"),
    NamePattern::Suffix(".txt"),
    NamePattern::Suffix(".doc"),
    NamePattern::Suffix(".docx"),
    NamePattern::Contains("permit"),
    NamePattern::Contains("license"),
    NamePattern::Contains("application"),
];

/// Lists regular files directly inside `dir` that match any of `patterns`.
///
/// Results are grouped by pattern in the order given, sorted by name within
/// each group, and de-duplicated keeping the first occurrence. A missing or
/// unreadable directory yields an empty list.
#[must_use]
pub fn find_files(dir: &Path, patterns: &[NamePattern]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect(),
        Err(e) => {
            log::debug!("Cannot read directory {}: {e}", dir.display());
            return Vec::new();
        }
    };
    files.sort();

    let mut found: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        for path in &files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if pattern.matches(name) && !found.contains(path) {
                found.push(path.clone());
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_permit_files_in_pattern_order() {
        let tmp = std::env::temp_dir().join("field_permits_discover_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(tmp.join("permit_dir")).unwrap();

        for name in ["b.txt", "a.pdf", "permit_scan.png", "notes.md", "a.txt"] {
            std::fs::write(tmp.join(name), "x").unwrap();
        }

        let found = find_files(&tmp, PERMIT_PATTERNS);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.pdf", "a.txt", "b.txt", "permit_scan.png"]);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_directory_is_empty() {
        let missing = std::env::temp_dir().join("field_permits_definitely_missing_dir");
        assert!(find_files(&missing, PERMIT_PATTERNS).is_empty());
    }
}
