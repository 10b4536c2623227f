use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Fallback context for lookups and for entries saved without one.
pub const GENERAL: &str = "General";

/// Contexts seeded into an empty store, in classifier priority order.
pub const DEFAULT_CONTEXTS: [&str; 4] = [GENERAL, "Name", "Technical", "Business"];

/// A named vocabulary domain.
///
/// Keywords and translation keys are always stored lower-cased. Both
/// collections are ordered so a saved context serializes the same way every
/// time.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Context {
    #[serde(skip)]
    pub name: String,

    #[serde(default)]
    pub keywords: BTreeSet<String>,

    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Context {
            name: name.into(),
            keywords: BTreeSet::new(),
            translations: BTreeMap::new(),
        }
    }

    /// Number of keywords occurring anywhere in `text_lower`.
    ///
    /// Plain substring containment, not word boundaries: "art" hits "start".
    pub fn keyword_hits(&self, text_lower: &str) -> usize {
        self.keywords
            .iter()
            .filter(|k| !k.is_empty() && text_lower.contains(k.as_str()))
            .count()
    }

    pub fn translation_for(&self, original: &str) -> Option<&str> {
        self.translations
            .get(&original.to_lowercase())
            .map(String::as_str)
    }
}
