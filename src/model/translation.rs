use serde::{Deserialize, Serialize};

use super::context::GENERAL;

/// A proposed replacement of a span of translated text.
///
/// `start_pos..end_pos` is a half-open range counted in `char`s, not bytes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationSuggestion {
    pub original_word: String,
    pub suggested_word: String,
    pub context: String,
    pub confidence: f64,
    pub start_pos: usize,
    pub end_pos: usize,
}

impl TranslationSuggestion {
    pub fn span_len(&self) -> usize {
        self.end_pos.saturating_sub(self.start_pos)
    }

    pub fn overlaps(&self, other: &TranslationSuggestion) -> bool {
        self.start_pos < other.end_pos && other.start_pos < self.end_pos
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TranslationStatus {
    Translated,
    EmptyInput,
    Failed { message: String },
    /// A newer request was started before this one finished.
    Superseded,
}

impl Default for TranslationStatus {
    fn default() -> Self {
        TranslationStatus::Translated
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationResult {
    pub full_text: String,
    pub detected_language: String,
    pub suggestions: Vec<TranslationSuggestion>,
    pub context: String,

    #[serde(default)]
    pub status: TranslationStatus,
}

impl TranslationResult {
    pub fn empty_input() -> Self {
        TranslationResult {
            full_text: String::new(),
            detected_language: String::new(),
            suggestions: Vec::new(),
            context: GENERAL.to_string(),
            status: TranslationStatus::EmptyInput,
        }
    }

    pub fn failed(context: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        TranslationResult {
            full_text: format!("Translation error: {message}"),
            detected_language: String::new(),
            suggestions: Vec::new(),
            context: context.into(),
            status: TranslationStatus::Failed { message },
        }
    }

    pub fn superseded(context: impl Into<String>) -> Self {
        TranslationResult {
            full_text: String::new(),
            detected_language: String::new(),
            suggestions: Vec::new(),
            context: context.into(),
            status: TranslationStatus::Superseded,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, TranslationStatus::Failed { .. })
    }
}
