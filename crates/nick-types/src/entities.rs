//! # Core Entities
//!
//! Identity, player handles and the directory change notification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Globally stable player identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random identity.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Identity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for Identity {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A player known to the host: identity plus real (account) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub identity: Identity,
    pub name: String,
}

impl PlayerRef {
    pub fn new(identity: Identity, name: impl Into<String>) -> Self {
        Self {
            identity,
            name: name.into(),
        }
    }
}

/// Broadcast whenever a stored nickname changes.
///
/// `nick == None` means "render the real name".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub identity: Identity,
    pub nick: Option<String>,
}

impl ChangeNotification {
    /// Build a notification, collapsing blank values to `None`.
    pub fn new(identity: Identity, nick: Option<String>) -> Self {
        Self {
            identity,
            nick: nick.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Who issued a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSource {
    /// An online player.
    Player(PlayerRef),
    /// The host console or another non-player sender.
    Console,
}

impl CommandSource {
    /// The player behind this source, if any.
    #[must_use]
    pub fn player(&self) -> Option<&PlayerRef> {
        match self {
            Self::Player(p) => Some(p),
            Self::Console => None,
        }
    }
}

/// Host timer granularity. One tick is a host-defined time unit.
pub type Ticks = u64;

/// Opaque id of a repeating host task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);
