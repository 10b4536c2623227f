use serde::{Deserialize, Serialize};

/// A dictionary entry whose original is close to a looked-up term.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SimilarEntry {
    pub original: String,
    pub translation: String,
    pub context: String,
    pub similarity: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LookupResult {
    Exact { translation: String },
    Similar { entries: Vec<SimilarEntry> },
    None,
}

impl LookupResult {
    pub fn translation(&self) -> Option<&str> {
        match self {
            LookupResult::Exact { translation } => Some(translation),
            _ => None,
        }
    }
}
