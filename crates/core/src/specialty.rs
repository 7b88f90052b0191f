//! Specialty index built from the catalog
//!
//! Each catalog fetch produces a fresh index owned by the conversation that
//! asked for it, so a numeric reply is always resolved against the list that
//! conversation was shown.

use serde::{Deserialize, Serialize};

/// Catalog entry that is never offered to the user
pub const NOT_APPLICABLE: &str = "No Aplica";

/// 1-based mapping from displayed number to specialty name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialtyIndex {
    names: Vec<String>,
}

impl SpecialtyIndex {
    /// Build an index from catalog names, keeping catalog order and dropping
    /// the "No Aplica" sentinel and blank entries.
    pub fn from_catalog<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case(NOT_APPLICABLE))
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name displayed under `number`, if any
    pub fn get(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    /// Resolve a user reply such as `"2"` or `"2."` to a specialty name
    pub fn resolve(&self, reply: &str) -> Option<&str> {
        let digits = reply.trim().trim_end_matches(['.', ')']);
        digits.parse::<usize>().ok().and_then(|n| self.get(n))
    }

    /// `(number, name)` pairs in display order
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (i + 1, name.as_str()))
    }

    /// Names in display order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Numbered list, one entry per line
    pub fn render(&self) -> String {
        self.entries()
            .map(|(n, name)| format!("*{n}.* {name}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_sentinel_and_numbers_from_one() {
        let index = SpecialtyIndex::from_catalog(["Cardiología", "No Aplica"]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(1), Some("Cardiología"));
        assert_eq!(index.get(0), None);
        assert_eq!(index.get(2), None);
    }

    #[test]
    fn keeps_catalog_order() {
        let index = SpecialtyIndex::from_catalog(["Pediatría", "No Aplica", "Dermatología", " "]);
        let entries: Vec<_> = index.entries().collect();
        assert_eq!(entries, vec![(1, "Pediatría"), (2, "Dermatología")]);
    }

    #[test]
    fn resolves_numeric_replies_only_in_range() {
        let index = SpecialtyIndex::from_catalog(["Cardiología", "Pediatría"]);
        assert_eq!(index.resolve("2"), Some("Pediatría"));
        assert_eq!(index.resolve(" 1. "), Some("Cardiología"));
        assert_eq!(index.resolve("3"), None);
        assert_eq!(index.resolve("0"), None);
        assert_eq!(index.resolve("-1"), None);
        assert_eq!(index.resolve("Pediatría"), None);
    }

    #[test]
    fn renders_numbered_lines() {
        let index = SpecialtyIndex::from_catalog(["Cardiología", "Pediatría"]);
        assert_eq!(index.render(), "*1.* Cardiología\n*2.* Pediatría");
    }
}
