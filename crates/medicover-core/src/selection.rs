//! Multi-select profession filter.
//!
//! Mirrors the sidebar checkbox list: every catalog entry has a checked flag,
//! and a free-text filter narrows which entries are visible. Hidden entries
//! keep their checked state.

use crate::catalog::{Profession, ProfessionCatalog};

#[derive(Debug, Clone)]
struct Entry {
    profession: Profession,
    checked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProfessionSelection {
    entries: Vec<Entry>,
    filter: String,
}

impl ProfessionSelection {
    /// All catalog entries, unchecked.
    pub fn from_catalog(catalog: &ProfessionCatalog) -> Self {
        let entries = catalog
            .iter()
            .map(|p| Entry {
                profession: p.clone(),
                checked: false,
            })
            .collect();
        ProfessionSelection {
            entries,
            filter: String::new(),
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Visible entries with their checked flag, in catalog order.
    pub fn filtered(&self) -> Vec<(&Profession, bool)> {
        let needle = self.filter.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.profession.matches(&needle))
            .map(|e| (&e.profession, e.checked))
            .collect()
    }

    /// `false` when the filter hides everything ("No matching options").
    pub fn has_matches(&self) -> bool {
        let needle = self.filter.trim().to_lowercase();
        self.entries.iter().any(|e| e.profession.matches(&needle))
    }

    /// Flips one entry. Returns the new state, or `false` for unknown codes.
    pub fn toggle(&mut self, code: &str) -> bool {
        match self.entry_mut(code) {
            Some(e) => {
                e.checked = !e.checked;
                e.checked
            }
            None => false,
        }
    }

    /// Sets one entry. Returns `false` if the code is unknown.
    pub fn set_checked(&mut self, code: &str, checked: bool) -> bool {
        match self.entry_mut(code) {
            Some(e) => {
                e.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn is_checked(&self, code: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.checked && e.profession.code == code)
    }

    /// Unchecks everything. The filter is left alone.
    pub fn clear(&mut self) {
        for e in &mut self.entries {
            e.checked = false;
        }
    }

    /// Checked codes in catalog order.
    pub fn selected_codes(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.checked)
            .map(|e| e.profession.code.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.checked).count()
    }

    fn entry_mut(&mut self, code: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.profession.code == code)
    }
}
