//! User-facing message templates.
//!
//! Templates use `&` color codes and `{placeholder}` substitution. A blank
//! template disables that message.

use nick_types::NickError;
use nn_01_text_codec::to_native;
use serde::{Deserialize, Serialize};

/// Identifies a template in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    NoPermission,
    PlayersOnly,
    Usage,
    Invalid,
    StyleDenied,
    NickSet,
    NickSetOther,
    NickCleared,
    NickClearedOther,
    HideSet,
    Unhide,
    UnhidOther,
    UnhidOtherNormal,
    NotHidden,
    PlayerNotFound,
    TargetExempt,
    Reloaded,
    ReloadFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MessageCatalog {
    pub no_perms: String,
    pub players_only: String,
    pub usage: String,
    pub invalid: String,
    pub style_denied: String,
    pub nick_set: String,
    pub nick_set_other: String,
    pub nick_cleared: String,
    pub nick_cleared_other: String,
    pub hide_set: String,
    pub unhide: String,
    pub unhid_other: String,
    pub unhid_other_normal: String,
    pub not_hidden: String,
    pub player_not_found: String,
    pub exempt: String,
    pub reloaded: String,
    pub reload_failed: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            no_perms: "&cYou don't have permission.".into(),
            players_only: "Players only.".into(),
            usage: "&cUsage: /nick <name|off|reset|clear> or /nick <playerOrNick> <name|off|reset|clear>"
                .into(),
            invalid: "&cInvalid nickname. Use 3+ letters, numbers or underscores.".into(),
            style_denied: "&cYou don't have permission to use {capability} in nicknames.".into(),
            nick_set: "&aYour nickname is now &f{nick}&a.".into(),
            nick_set_other: "&aSet &f{target}&a to &f{nick}&a.".into(),
            nick_cleared: "&aYour nickname was cleared.".into(),
            nick_cleared_other: "&aCleared &f{target}&a's nickname.".into(),
            hide_set: "&aYou are now hidden as &f{nick}&a.".into(),
            unhide: "&aYou are visible again as &f{nick}&a.".into(),
            unhid_other: "&aUnhid &f{target}&a (restored &f{nick}&a).".into(),
            unhid_other_normal: "&aUnhid &f{target}&a (restored normal name).".into(),
            not_hidden: "&cThat player is not hidden.".into(),
            player_not_found: "&cPlayer not found.".into(),
            exempt: "&cThat player is nickname-exempt.".into(),
            reloaded: "&aNetworkNick reloaded.".into(),
            reload_failed: "&cReload failed, see console.".into(),
        }
    }
}

impl MessageCatalog {
    pub fn template(&self, key: MessageKey) -> &str {
        match key {
            MessageKey::NoPermission => &self.no_perms,
            MessageKey::PlayersOnly => &self.players_only,
            MessageKey::Usage => &self.usage,
            MessageKey::Invalid => &self.invalid,
            MessageKey::StyleDenied => &self.style_denied,
            MessageKey::NickSet => &self.nick_set,
            MessageKey::NickSetOther => &self.nick_set_other,
            MessageKey::NickCleared => &self.nick_cleared,
            MessageKey::NickClearedOther => &self.nick_cleared_other,
            MessageKey::HideSet => &self.hide_set,
            MessageKey::Unhide => &self.unhide,
            MessageKey::UnhidOther => &self.unhid_other,
            MessageKey::UnhidOtherNormal => &self.unhid_other_normal,
            MessageKey::NotHidden => &self.not_hidden,
            MessageKey::PlayerNotFound => &self.player_not_found,
            MessageKey::TargetExempt => &self.exempt,
            MessageKey::Reloaded => &self.reloaded,
            MessageKey::ReloadFailed => &self.reload_failed,
        }
    }

    /// Render `key` with `{name}` substitutions, in native color spelling.
    /// `None` when the template is blank.
    pub fn render(&self, key: MessageKey, vars: &[(&str, &str)]) -> Option<String> {
        let template = self.template(key);
        if template.trim().is_empty() {
            return None;
        }
        let mut out = template.to_string();
        for (name, value) in vars {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        Some(to_native(&out))
    }

    /// Template and variables for a user-facing failure.
    pub fn for_error(err: &NickError) -> (MessageKey, Vec<(&'static str, String)>) {
        match err {
            NickError::InvalidCharacter { .. } | NickError::InvalidNickname { .. } => {
                (MessageKey::Invalid, Vec::new())
            }
            NickError::PermissionDenied { capability } => (
                MessageKey::StyleDenied,
                vec![("capability", capability.clone())],
            ),
            NickError::NotHidden => (MessageKey::NotHidden, Vec::new()),
            NickError::TargetNotFound { input } => {
                (MessageKey::PlayerNotFound, vec![("target", input.clone())])
            }
            NickError::TargetExempt => (MessageKey::TargetExempt, Vec::new()),
            NickError::PlayersOnly => (MessageKey::PlayersOnly, Vec::new()),
        }
    }
}
