//! PresenceCache: what each online player is currently rendered as.
//!
//! Two maps per process:
//!
//! - `visible`: the raw string last rendered (nickname or real name)
//! - `stored`: the last directory value seen, used only to classify hidden state
//!
//! Both are lossy mirrors; the directory is authoritative. Rendering must
//! happen on the authoritative thread, the maps themselves may be read from
//! anywhere.

use crate::surfaces::SurfaceSet;
use nick_types::{Identity, PlayerRef};
use nn_01_text_codec::is_hide_nick;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

pub struct PresenceCache {
    surfaces: SurfaceSet,
    visible: RwLock<HashMap<Identity, String>>,
    stored: RwLock<HashMap<Identity, String>>,
}

impl PresenceCache {
    pub fn new(surfaces: SurfaceSet) -> Self {
        Self {
            surfaces,
            visible: RwLock::new(HashMap::new()),
            stored: RwLock::new(HashMap::new()),
        }
    }

    pub fn surfaces(&self) -> &SurfaceSet {
        &self.surfaces
    }

    /// Record and render `nick` for `player`, or the real name when absent/blank.
    pub fn apply(&self, player: &PlayerRef, nick: Option<&str>) {
        let nick = nick.filter(|n| !n.trim().is_empty());
        let shown = nick.unwrap_or(&player.name).to_string();

        match nick {
            Some(n) => {
                self.stored.write().insert(player.identity, n.to_string());
            }
            None => {
                self.stored.write().remove(&player.identity);
            }
        }
        self.visible.write().insert(player.identity, shown.clone());

        debug!(identity = %player.identity, nick = ?nick, "Applying presence");
        self.surfaces.present(player.identity, &shown);
    }

    /// Render the cached value again without touching the maps.
    pub fn rerender(&self, player: &PlayerRef) {
        let shown = self.get_visible(player.identity, &player.name);
        self.surfaces.present(player.identity, &shown);
    }

    /// Evict both maps. Safe to call for unknown identities.
    pub fn clear(&self, identity: Identity) {
        self.visible.write().remove(&identity);
        self.stored.write().remove(&identity);
    }

    /// Rendered value, never blank: falls back to `fallback`.
    pub fn get_visible(&self, identity: Identity, fallback: &str) -> String {
        self.visible
            .read()
            .get(&identity)
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Mirrored directory value.
    pub fn get_stored(&self, identity: Identity) -> Option<String> {
        self.stored.read().get(&identity).cloned()
    }

    pub fn is_hidden(&self, identity: Identity) -> bool {
        self.stored
            .read()
            .get(&identity)
            .is_some_and(|raw| is_hide_nick(raw))
    }

    pub fn len(&self) -> usize {
        self.visible.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.read().is_empty()
    }
}
