//! Country display name to ISO alpha-2 code lookup.
//!
//! Candidate text is matched by case-insensitive substring containment: a
//! table key matches when it appears anywhere in the lowercased candidate.
//! When several keys match, the longest wins ("Nigeria" over "Niger",
//! "Romania" over "Oman"); equally long keys resolve to the one listed
//! first in the table.

mod table;

pub use table::COUNTRIES;

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    name: String,
    code: String,
}

/// A successful lookup: the table entry whose key matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryMatch<'a> {
    pub name: &'a str,
    pub code: &'a str,
}

/// Immutable name → code table. Build once and share.
#[derive(Debug, Clone)]
pub struct CountryLookup {
    entries: Vec<Entry>,
}

impl Default for CountryLookup {
    fn default() -> Self {
        Self::from_entries(COUNTRIES.iter().copied())
    }
}

impl CountryLookup {
    /// Build a lookup from `(display name, code)` pairs; iteration order is
    /// the tie-break order. Codes are normalised to uppercase.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|(name, _)| !name.trim().is_empty())
            .map(|(name, code)| Entry {
                key: name.trim().to_lowercase(),
                name: name.trim().to_string(),
                code: code.trim().to_ascii_uppercase(),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name of the first entry carrying `code`.
    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.code.eq_ignore_ascii_case(code))
            .map(|e| e.name.as_str())
    }

    /// ISO code of the best matching country in `text`.
    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.lookup_entry(text).map(|m| m.code)
    }

    /// Best matching entry in `text`, see the module docs for the policy.
    pub fn lookup_entry(&self, text: &str) -> Option<CountryMatch<'_>> {
        let candidate = text.to_lowercase();
        let mut best: Option<&Entry> = None;
        for entry in &self.entries {
            if !candidate.contains(&entry.key) {
                continue;
            }
            // strictly longer only, so the earlier entry keeps a tie
            if best.is_none_or(|b| entry.key.len() > b.key.len()) {
                best = Some(entry);
            }
        }
        best.map(|e| CountryMatch {
            name: &e.name,
            code: &e.code,
        })
    }
}
