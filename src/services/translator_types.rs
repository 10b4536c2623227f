use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the external translator hands back for one call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RawTranslation {
    pub translated_text: String,
    pub detected_source_lang: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum TranslateError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("provider {0} needs an API key")]
    MissingApiKey(String),
}

/// The machine-translation collaborator.
///
/// Implementations may block; callers must not hold shared locks across a
/// call.
#[cfg_attr(test, mockall::automock)]
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<RawTranslation, TranslateError>;
}
