//! Field documentation lookup.
//!
//! Help text can ride on the field itself or come from an external source
//! (a doc extractor, a localization table). Per-field help wins over the
//! source when both exist.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Anything that can answer "what is the help text for this field?".
pub trait DocSource {
    fn doc(&self, field: &str) -> Option<&str>;
}

/// An ordered field-name → help-text table, the plain-data [`DocSource`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocMap {
    entries: IndexMap<String, String>,
}

impl DocMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(field, text);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(field.into(), text.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DocSource for DocMap {
    fn doc(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        let docs = DocMap::new().with("a", "the first flag");
        assert_eq!(docs.doc("a"), Some("the first flag"));
        assert_eq!(docs.doc("b"), None);
    }
}
