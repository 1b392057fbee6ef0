//! Presence configuration: which surfaces to drive and how long to enforce.

use nick_types::{SurfaceKind, Ticks};
use serde::{Deserialize, Serialize};

/// Enabled presentation surfaces.
///
/// Host surfaces of kind `Other` (rich-text variants) follow `display_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ApplyConfig {
    pub display_name: bool,
    pub playerlist_name: bool,
    pub custom_name: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            display_name: true,
            playerlist_name: true,
            custom_name: true,
        }
    }
}

impl ApplyConfig {
    pub fn enables(&self, kind: SurfaceKind) -> bool {
        match kind {
            SurfaceKind::DisplayName | SurfaceKind::Other => self.display_name,
            SurfaceKind::PlayerListName => self.playerlist_name,
            SurfaceKind::CustomName => self.custom_name,
        }
    }
}

/// Post-connect enforcement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EnforceConfig {
    /// Ticks between enforcement runs.
    pub period_ticks: Ticks,
    /// Enforcement runs before the session settles.
    pub max_runs: u32,
}

impl Default for EnforceConfig {
    fn default() -> Self {
        Self {
            period_ticks: 10,
            max_runs: 6,
        }
    }
}

impl EnforceConfig {
    /// Clamp a zero period up to one tick.
    pub fn normalized(self) -> Self {
        Self {
            period_ticks: self.period_ticks.max(1),
            max_runs: self.max_runs,
        }
    }
}
