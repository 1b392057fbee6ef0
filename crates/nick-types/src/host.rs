//! # Host Collaborator Ports
//!
//! The host process (game server) is external. Only its call shape matters:
//!
//! - a single authoritative thread, reachable with `run_on_authoritative`
//! - a repeating timer keyed by an opaque `TaskId`
//! - lookups for connected and known players
//! - a set of presentation surfaces, resolved once at startup
//!
//! Implementations must make `run_on_authoritative` safe to call from the
//! authoritative thread itself (the task then runs inline).

use crate::entities::{CommandSource, Identity, PlayerRef, TaskId, Ticks};
use crate::errors::SurfaceError;
use std::sync::Arc;

/// One-shot work for the authoritative thread.
pub type AuthoritativeTask = Box<dyn FnOnce() + Send + 'static>;

/// Repeating work for the authoritative thread.
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// Host process surface consumed by the nickname engine.
pub trait HostContext: Send + Sync {
    /// Schedule `task` on the authoritative thread. Runs inline when already there.
    fn run_on_authoritative(&self, task: AuthoritativeTask);

    /// Whether the caller is currently on the authoritative thread.
    fn is_authoritative_thread(&self) -> bool;

    /// Run `task` on the authoritative thread after `delay` ticks, then every `period` ticks.
    fn schedule_repeating(&self, delay: Ticks, period: Ticks, task: RepeatingTask) -> TaskId;

    /// Cancel a repeating task. Unknown or already-cancelled ids are ignored.
    fn cancel_scheduled(&self, id: TaskId);

    /// Whether `identity` is connected to this process.
    fn is_connected(&self, identity: Identity) -> bool;

    /// The live connection for `identity`, if connected.
    fn connection(&self, identity: Identity) -> Option<PlayerRef>;

    /// Every player connected to this process.
    fn online_players(&self) -> Vec<PlayerRef>;

    /// Online player whose real name matches exactly (case-insensitive).
    fn find_online_by_name(&self, name: &str) -> Option<PlayerRef>;

    /// Known (possibly offline) player by real name.
    fn offline_player(&self, name: &str) -> Option<PlayerRef>;

    /// Known (possibly offline) player by identity.
    fn offline_player_by_id(&self, identity: Identity) -> Option<PlayerRef>;

    /// Online-only permission check.
    fn has_permission(&self, identity: Identity, node: &str) -> bool;

    /// Deliver a message to a command source. Authoritative thread only.
    fn send_message(&self, to: &CommandSource, message: &str);

    /// Presentation surfaces this host can drive.
    fn available_surfaces(&self) -> Vec<Arc<dyn PresentationSurface>>;
}

/// Which host channel a surface renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Chat display name.
    DisplayName,
    /// Roster / tab list entry.
    PlayerListName,
    /// Entity custom name (kept invisible for players).
    CustomName,
    /// Rich-text variants and anything else the host exposes.
    Other,
}

impl SurfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DisplayName => "display-name",
            Self::PlayerListName => "playerlist-name",
            Self::CustomName => "custom-name",
            Self::Other => "other",
        }
    }
}

/// A host channel through which a rendered name is shown to others.
///
/// Each surface is independently fallible.
pub trait PresentationSurface: Send + Sync {
    fn kind(&self) -> SurfaceKind;

    /// Render `value` for `identity`.
    fn present(&self, identity: Identity, value: &str) -> Result<(), SurfaceError>;

    /// Currently rendered value, or `Ok(None)` when the surface cannot be read back.
    fn current(&self, identity: Identity) -> Result<Option<String>, SurfaceError>;
}
