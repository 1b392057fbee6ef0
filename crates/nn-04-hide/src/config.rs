//! Hidden-nickname selection.

use nn_01_text_codec::{
    force_hide_token, strip, trim_to_visible, validate_charset, HIDE_TOKEN, MIN_VISIBLE_LEN,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_GENERATED_LENGTH: i64 = 12;
pub const DEFAULT_FILLER: char = ':';

/// `[hide]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HideConfig {
    /// Operator-chosen hidden nickname. Blank means generate one.
    pub nick: String,
    /// Visible length of a generated hidden nickname.
    pub random_length: i64,
    pub filler: char,
}

impl Default for HideConfig {
    fn default() -> Self {
        Self {
            nick: String::new(),
            random_length: DEFAULT_GENERATED_LENGTH,
            filler: DEFAULT_FILLER,
        }
    }
}

impl HideConfig {
    /// The value written when a player hides.
    ///
    /// A configured nickname wins when it has visible content and a valid
    /// charset; it always carries the hide token and is trimmed to
    /// `max_visible_len`. Otherwise the hide token followed by `filler`
    /// repeated `random_length` times, clamped to `[3, max_visible_len]`.
    pub fn hidden_value(&self, max_visible_len: usize) -> String {
        if let Some(configured) = self.configured(max_visible_len) {
            return configured;
        }
        let len = self
            .random_length
            .clamp(MIN_VISIBLE_LEN as i64, max_visible_len.max(MIN_VISIBLE_LEN) as i64)
            as usize;
        let filler = if self.filler.is_whitespace() {
            DEFAULT_FILLER
        } else {
            self.filler
        };
        let mut value = String::with_capacity(HIDE_TOKEN.len() + len);
        value.push_str(HIDE_TOKEN);
        value.extend(std::iter::repeat(filler).take(len));
        value
    }

    fn configured(&self, max_visible_len: usize) -> Option<String> {
        let raw = self.nick.trim();
        if strip(raw).trim().is_empty() {
            return None;
        }
        let forced = force_hide_token(raw);
        if let Err(e) = validate_charset(&forced) {
            warn!(error = %e, "Configured hide nickname is invalid, generating one instead");
            return None;
        }
        Some(trim_to_visible(&forced, max_visible_len))
    }
}
