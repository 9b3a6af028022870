//! Localized string table used for section titles and other fixed text.

use std::collections::HashMap;

use crate::util::title_case;

/// Resource items keyed by id (e.g. `title_remarks`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    items: HashMap<String, String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles for the built-in sections.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (id, text) in [
            ("title_parameters", "Parameters"),
            ("title_returns", "Return Value"),
            ("title_remarks", "Remarks"),
            ("title_examples", "Examples"),
            ("title_exceptions", "Exceptions"),
            ("title_seeAlso", "See Also"),
            ("title_note", "Note"),
            ("title_caution", "Caution"),
            ("title_important", "Important"),
            ("title_tip", "Tip"),
        ] {
            table.insert(id, text);
        }
        table
    }

    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.items.insert(id.into(), text.into());
    }

    /// Add all items from `other`, replacing existing ids.
    pub fn merge(&mut self, other: StringTable) {
        self.items.extend(other.items);
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.items.get(id).map(String::as_str)
    }

    /// The item text, or a readable form of the id when it is missing.
    ///
    /// `title_customSection` falls back to `Custom Section`.
    pub fn get_or_fallback(&self, id: &str) -> String {
        match self.get(id) {
            Some(text) => text.to_owned(),
            None => title_case(id.strip_prefix("title_").unwrap_or(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
