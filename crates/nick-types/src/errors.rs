//! # Error Types
//!
//! User-facing failures and the collaborator fault types.

use thiserror::Error;

/// Failures reported back to the user who issued a command.
///
/// None of these are faults; they are never logged above `debug`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NickError {
    /// The candidate contains something outside the token/character grammar.
    #[error("Invalid character at position {position}")]
    InvalidCharacter { position: usize },

    /// The candidate is structurally valid but unacceptable (too short, blank).
    #[error("Invalid nickname: {reason}")]
    InvalidNickname { reason: String },

    /// The actor lacks a capability.
    #[error("Missing permission for {capability}")]
    PermissionDenied { capability: String },

    /// Unhide was requested for an identity that is not hidden.
    #[error("That player is not hidden")]
    NotHidden,

    /// A name or identity argument did not resolve to a player.
    #[error("Player not found: {input}")]
    TargetNotFound { input: String },

    /// The target is exempt from being nicknamed by others.
    #[error("That player is nickname-exempt")]
    TargetExempt,

    /// The command was issued by a non-player where a player is required.
    #[error("Players only")]
    PlayersOnly,
}

/// A presentation surface refused or failed an operation.
#[derive(Debug, Clone, Error)]
#[error("Surface {surface} failed: {message}")]
pub struct SurfaceError {
    pub surface: String,
    pub message: String,
}

impl SurfaceError {
    pub fn new(surface: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            message: message.into(),
        }
    }
}

/// Remote permission provider failures.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("User {0} could not be loaded")]
    UserNotLoaded(String),

    #[error("Provider lookup failed: {0}")]
    Lookup(String),
}
