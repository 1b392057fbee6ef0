//! Resolve a command argument to a player, online or not.
//!
//! Order: exact real name online, exact visible name online, unique partial
//! visible name online, UUID, known offline player by name.

use nick_types::{HostContext, Identity, NickError, PlayerRef};
use nn_01_text_codec::normalize_for_compare;
use nn_03_presence::PresenceCache;

pub struct TargetResolver<'a> {
    host: &'a dyn HostContext,
    presence: &'a PresenceCache,
}

impl<'a> TargetResolver<'a> {
    pub fn new(host: &'a dyn HostContext, presence: &'a PresenceCache) -> Self {
        Self { host, presence }
    }

    /// Authoritative thread only.
    pub fn resolve(&self, input: &str) -> Result<PlayerRef, NickError> {
        let raw = input.trim();
        let not_found = || NickError::TargetNotFound {
            input: raw.to_string(),
        };
        if raw.is_empty() {
            return Err(not_found());
        }

        if let Some(exact) = self.host.find_online_by_name(raw) {
            return Ok(exact);
        }

        let wanted = normalize_for_compare(raw);
        let online: Vec<(PlayerRef, String)> = self
            .host
            .online_players()
            .into_iter()
            .map(|p| {
                let shown = normalize_for_compare(&self.presence.get_visible(p.identity, &p.name));
                (p, shown)
            })
            .collect();

        if let Some((p, _)) = online.iter().find(|(_, shown)| *shown == wanted) {
            return Ok(p.clone());
        }

        if !wanted.is_empty() {
            let mut partial = online.iter().filter(|(_, shown)| shown.contains(&wanted));
            if let (Some((p, _)), None) = (partial.next(), partial.next()) {
                return Ok(p.clone());
            }
        }

        if let Ok(identity) = raw.parse::<Identity>() {
            return Ok(self
                .host
                .offline_player_by_id(identity)
                .unwrap_or_else(|| PlayerRef::new(identity, raw)));
        }

        self.host.offline_player(raw).ok_or_else(not_found)
    }
}
