//! Placeholder expansion for other host components (`%networknick_<param>%`).
//!
//! | Param | Value |
//! |-------|-------|
//! | `name` | visible name |
//! | `unhidden` | hidden: prior nickname, else real name; otherwise the visible name |
//! | `hidden` | `true` / `false` |

use crate::context::CommandContext;
use nick_types::PlayerRef;
use nn_01_text_codec::to_native;
use nn_04_hide::HideState;
use std::sync::Arc;

pub const PLACEHOLDER_PREFIX: &str = "networknick";

pub struct Placeholders {
    ctx: Arc<CommandContext>,
}

impl Placeholders {
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        Self { ctx }
    }

    /// Expand `param` for `player`. `None` for unknown params.
    ///
    /// Reads the directory for hide state; do not await on the authoritative thread.
    pub async fn resolve(&self, player: &PlayerRef, param: &str) -> Option<String> {
        match param.trim().to_ascii_lowercase().as_str() {
            "name" => Some(self.visible(player)),
            "hidden" => Some(self.ctx.hide.state(player.identity).await.is_hidden().to_string()),
            "unhidden" => Some(match self.ctx.hide.state(player.identity).await {
                HideState::Hidden { prior, .. } => prior
                    .map(|p| to_native(&p))
                    .unwrap_or_else(|| player.name.clone()),
                HideState::Visible(_) => self.visible(player),
            }),
            _ => None,
        }
    }

    fn visible(&self, player: &PlayerRef) -> String {
        to_native(&self.ctx.presence.get_visible(player.identity, &player.name))
    }
}
