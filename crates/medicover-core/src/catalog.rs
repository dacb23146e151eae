//! Profession catalog.
//!
//! The catalog is a plain text file with one profession per line. A line may
//! be either a bare code (`10`) or `code|label` (`10|Médecin`). Blank lines are
//! ignored and the first occurrence of a code wins.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Serialize;

/// Error types that can occur while loading the catalog.
#[derive(Debug, Clone)]
pub enum CatalogError {
    /// I/O error while reading the catalog file.
    Io(String),
    /// The file contained no professions.
    Empty,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(msg) => write!(f, "I/O error: {}", msg),
            CatalogError::Empty => write!(f, "profession catalog is empty"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// A single selectable profession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct Profession {
    /// Profession code passed to the renderer (e.g. "10").
    pub code: String,
    /// Human-readable label shown in the sidebar.
    pub label: String,
}

impl Profession {
    /// Parses one trimmed, non-empty catalog line.
    fn from_line(line: &str) -> Self {
        match line.split_once('|') {
            Some((code, label)) => {
                let code = code.trim();
                let label = match label.trim() {
                    "" => code,
                    l => l,
                };
                Profession {
                    code: code.to_string(),
                    label: label.to_string(),
                }
            }
            None => Profession {
                code: line.to_string(),
                label: line.to_string(),
            },
        }
    }

    /// Case-insensitive substring match against label and code.
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.label.to_lowercase().contains(needle)
            || self.code.to_lowercase().contains(needle)
    }
}

/// Ordered list of professions, in file order.
#[derive(Debug, Clone, Default)]
pub struct ProfessionCatalog {
    entries: Vec<Profession>,
}

impl ProfessionCatalog {
    /// Parses catalog text. Never fails; an empty text yields an empty catalog.
    pub fn parse(text: &str) -> Self {
        let mut seen = HashSet::new();
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(Profession::from_line)
            .filter(|p| !p.code.is_empty() && seen.insert(p.code.clone()))
            .collect();
        ProfessionCatalog { entries }
    }

    /// Reads and parses a catalog file. An empty catalog is an error.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::parse(&text);
        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profession> {
        self.entries.iter()
    }

    pub fn get(&self, code: &str) -> Option<&Profession> {
        self.entries.iter().find(|p| p.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Professions matching `filter` (case-insensitive), in catalog order.
    pub fn filter(&self, filter: &str) -> Vec<&Profession> {
        let needle = filter.trim().to_lowercase();
        self.entries.iter().filter(|p| p.matches(&needle)).collect()
    }

    /// Renders the catalog back to its text form.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for p in &self.entries {
            if p.code == p.label {
                out.push_str(&p.code);
            } else {
                out.push_str(&p.code);
                out.push('|');
                out.push_str(&p.label);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "10|Médecin\n\n  21|Pharmacien  \n40|Chirurgien-Dentiste\n10|Duplicate\n96\n";

    #[test]
    fn test_parse_skips_blank_lines_and_duplicates() {
        let catalog = ProfessionCatalog::parse(SAMPLE);
        let codes: Vec<&str> = catalog.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["10", "21", "40", "96"]);
        assert_eq!(catalog.get("10").unwrap().label, "Médecin");
    }

    #[test]
    fn test_parse_bare_code_uses_code_as_label() {
        let catalog = ProfessionCatalog::parse("96\n");
        let p = catalog.get("96").unwrap();
        assert_eq!(p.label, "96");
    }

    #[test]
    fn test_parse_empty_label_falls_back_to_code() {
        let catalog = ProfessionCatalog::parse("50|\n");
        assert_eq!(catalog.get("50").unwrap().label, "50");
    }

    #[test]
    fn test_filter_case_insensitive() {
        let catalog = ProfessionCatalog::parse(SAMPLE);
        let found: Vec<&str> = catalog
            .filter("PHARM")
            .into_iter()
            .map(|p| p.code.as_str())
            .collect();
        assert_eq!(found, vec!["21"]);
        assert_eq!(catalog.filter("").len(), 4);
        assert!(catalog.filter("xyz").is_empty());
    }

    #[test]
    fn test_filter_matches_code() {
        let catalog = ProfessionCatalog::parse(SAMPLE);
        assert_eq!(catalog.filter("40").len(), 1);
    }

    #[test]
    fn test_to_text() {
        let catalog = ProfessionCatalog::parse(SAMPLE);
        assert_eq!(
            catalog.to_text(),
            "10|Médecin\n21|Pharmacien\n40|Chirurgien-Dentiste\n96\n"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProfessionCatalog::load(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("professions.txt");
        std::fs::write(&path, "\n   \n").unwrap();
        let err = ProfessionCatalog::load(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("professions.txt");
        std::fs::write(&path, SAMPLE).unwrap();
        let catalog = ProfessionCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.contains("21"));
        assert!(!catalog.contains("99"));
    }
}
