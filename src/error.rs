//! Error types shared by the vocabulary store, the editor operations and the
//! host protocol.
//!
//! Every variant serializes as `{"type": ..., "message": ...}` so protocol
//! replies can carry them unchanged.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum CoreError {
    /// The settings backend could not persist a value.
    #[error("settings store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    /// A required editor field was blank after trimming.
    #[error("{0} is required")]
    EmptyField(&'static str),

    /// The context cannot be deleted.
    #[error("cannot delete the {0} context")]
    ProtectedContext(String),

    #[error("unknown context: {0}")]
    UnknownContext(String),

    #[error("no dictionary entry at index {0}")]
    EntryIndex(usize),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Json(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = CoreError::ProtectedContext("General".to_string());
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["type"], "ProtectedContext");
        assert_eq!(v["message"], "General");
        assert_eq!(err.to_string(), "cannot delete the General context");
    }

    #[test]
    fn empty_field_message_names_the_field() {
        assert_eq!(
            CoreError::EmptyField("original").to_string(),
            "original is required"
        );
    }
}
