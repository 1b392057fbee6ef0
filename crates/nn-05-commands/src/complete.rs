//! Tab completion for `/nick`.

use crate::context::CommandContext;
use crate::nick::{is_clear_word, CLEAR_WORDS};
use nick_types::CommandSource;
use nn_01_text_codec::{normalize_for_compare, strip};
use std::collections::HashSet;
use std::sync::Arc;

pub struct NickCompleter {
    ctx: Arc<CommandContext>,
}

impl NickCompleter {
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        Self { ctx }
    }

    /// Suggestions for the last argument in `args`. Authoritative thread.
    pub fn complete(&self, source: &CommandSource, args: &[&str]) -> Vec<String> {
        let nodes = self.ctx.settings().nodes.clone();
        let mut out = Vec::new();

        match args {
            [first] => {
                let prefix = first.trim().to_lowercase();
                if self.ctx.allowed(source, &nodes.nick_clear) {
                    out.extend(clear_words(&prefix));
                }
                let manages_others = self.ctx.allowed(source, &nodes.nick_others)
                    || self.ctx.allowed(source, &nodes.nick_others_clear);
                if manages_others {
                    out.extend(self.online_names(&prefix));
                }
            }
            [first, second] => {
                if is_clear_word(first) {
                    return Vec::new();
                }
                if self.ctx.allowed(source, &nodes.nick_others_clear) {
                    out.extend(clear_words(&second.trim().to_lowercase()));
                }
            }
            _ => {}
        }

        let mut seen = HashSet::new();
        out.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect()
    }

    /// Real names by prefix, else the stripped visible name by normalized prefix.
    fn online_names(&self, prefix: &str) -> Vec<String> {
        let wanted = normalize_for_compare(prefix);
        self.ctx
            .host
            .online_players()
            .into_iter()
            .filter_map(|p| {
                if p.name.to_lowercase().starts_with(prefix) {
                    return Some(p.name);
                }
                let visible = strip(&self.ctx.presence.get_visible(p.identity, &p.name));
                normalize_for_compare(&visible)
                    .starts_with(&wanted)
                    .then_some(visible)
            })
            .collect()
    }
}

fn clear_words(prefix: &str) -> impl Iterator<Item = String> + '_ {
    CLEAR_WORDS
        .iter()
        .filter(move |w| w.starts_with(prefix))
        .map(|w| (*w).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{source, Harness};

    #[tokio::test]
    async fn test_plain_user_gets_nothing() {
        let h = Harness::new();
        let steve = h.player("Steve", &["networknick.nick"]);
        let c = NickCompleter::new(h.ctx.clone());
        assert!(c.complete(&source(&steve), &[""]).is_empty());
    }

    #[tokio::test]
    async fn test_clear_words_by_prefix() {
        let h = Harness::new();
        let steve = h.player("Steve", &["networknick.nick.clear"]);
        let c = NickCompleter::new(h.ctx.clone());
        assert_eq!(c.complete(&source(&steve), &["R"]), vec!["reset"]);
        assert_eq!(c.complete(&source(&steve), &[""]).len(), 3);
    }

    #[tokio::test]
    async fn test_names_and_visible_names_for_managers() {
        let h = Harness::new();
        let admin = h.player("Admin", &["networknick.nick.others"]);
        let steve = h.player("Steve", &[]);
        h.presence.apply(&steve, Some("&aBobby"));
        let c = NickCompleter::new(h.ctx.clone());

        assert_eq!(c.complete(&source(&admin), &["st"]), vec!["Steve"]);
        assert_eq!(c.complete(&source(&admin), &["bo"]), vec!["Bobby"]);
    }

    #[tokio::test]
    async fn test_second_argument() {
        let h = Harness::new();
        let admin = h.player("Admin", &["networknick.nick.others.clear"]);
        let c = NickCompleter::new(h.ctx.clone());
        assert_eq!(c.complete(&source(&admin), &["Steve", "cl"]), vec!["clear"]);
        assert!(c.complete(&source(&admin), &["off", ""]).is_empty());
        assert!(c.complete(&source(&admin), &["Steve", "x", ""]).is_empty());
    }

    #[tokio::test]
    async fn test_results_are_deduplicated() {
        let h = Harness::new();
        let admin = h.player("Admin", &["networknick.nick.others"]);
        let p = h.player("Offy", &[]);
        h.presence.apply(&p, Some("Offy"));
        h.host.grant(admin.identity, "networknick.nick.clear");
        let c = NickCompleter::new(h.ctx.clone());
        assert_eq!(c.complete(&source(&admin), &["off"]), vec!["off", "Offy"]);
    }
}
