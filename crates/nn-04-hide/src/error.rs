//! Hide state machine errors

use nick_types::NickError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HideError {
    /// Unhide requested for an identity that is not hidden.
    #[error("Identity is not hidden")]
    NotHidden,
}

impl From<HideError> for NickError {
    fn from(err: HideError) -> Self {
        match err {
            HideError::NotHidden => NickError::NotHidden,
        }
    }
}
