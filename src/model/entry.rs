use serde::{Deserialize, Serialize};

use super::context::GENERAL;

fn default_context() -> String {
    GENERAL.to_string()
}

/// One user-defined original -> translation pair, scoped to a context.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    #[serde(default)]
    pub original: String,

    #[serde(default)]
    pub translation: String,

    #[serde(default = "default_context")]
    pub context: String,
}

impl DictionaryEntry {
    pub fn new(
        original: impl Into<String>,
        translation: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        DictionaryEntry {
            original: original.into(),
            translation: translation.into(),
            context: context.into(),
        }
    }

    /// Key under which the entry lives in its context's translation map.
    pub fn key(&self) -> String {
        self.original.to_lowercase()
    }

    pub fn matches(&self, original: &str, context: &str) -> bool {
        self.context == context && self.original.to_lowercase() == original.to_lowercase()
    }
}

/// What `add_entry` did with its input.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryUpsert {
    Added,
    Updated,
}
