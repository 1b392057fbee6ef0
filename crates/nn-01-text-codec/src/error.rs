//! Error types for the text codec and nickname validation

use crate::domain::StyleClass;
use nick_types::NickError;
use thiserror::Error;

/// Reasons a candidate nickname is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Empty nickname")]
    Empty,

    #[error("Invalid character {found:?} at position {position}")]
    InvalidCharacter { position: usize, found: char },

    #[error("Too short: {visible_len} visible characters, need {min}")]
    TooShort { visible_len: usize, min: usize },

    #[error("Missing {class} capability ({node})")]
    PermissionDenied { class: StyleClass, node: String },
}

impl From<CodecError> for NickError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Empty => NickError::InvalidNickname {
                reason: "empty".to_string(),
            },
            CodecError::InvalidCharacter { position, .. } => {
                NickError::InvalidCharacter { position }
            }
            CodecError::TooShort { visible_len, min } => NickError::InvalidNickname {
                reason: format!("{visible_len} visible characters, need at least {min}"),
            },
            CodecError::PermissionDenied { class, .. } => NickError::PermissionDenied {
                capability: class.name().to_string(),
            },
        }
    }
}
