//! Maps host command labels to entry points.

use crate::complete::NickCompleter;
use crate::context::{CommandContext, Dispatch};
use crate::hide::{HideCommand, UnhideCommand};
use crate::nick::NickCommand;
use crate::placeholders::Placeholders;
use crate::reload::{ReloadCommand, Reloadable};
use nick_types::CommandSource;
use std::sync::Arc;

pub const LABELS: [&str; 4] = ["nick", "hide", "unhide", "networknick"];

pub struct CommandRouter {
    ctx: Arc<CommandContext>,
    nick: NickCommand,
    hide: HideCommand,
    unhide: UnhideCommand,
    reload: ReloadCommand,
    completer: NickCompleter,
    placeholders: Placeholders,
}

impl CommandRouter {
    pub fn new(ctx: Arc<CommandContext>, reloadable: Arc<dyn Reloadable>) -> Self {
        Self {
            nick: NickCommand::new(Arc::clone(&ctx)),
            hide: HideCommand::new(Arc::clone(&ctx)),
            unhide: UnhideCommand::new(Arc::clone(&ctx)),
            reload: ReloadCommand::new(Arc::clone(&ctx), reloadable),
            completer: NickCompleter::new(Arc::clone(&ctx)),
            placeholders: Placeholders::new(Arc::clone(&ctx)),
            ctx,
        }
    }

    pub fn context(&self) -> &Arc<CommandContext> {
        &self.ctx
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// `None` when `label` (or the `/networknick` subcommand) is not ours.
    pub fn dispatch(&self, source: &CommandSource, label: &str, args: &[&str]) -> Option<Dispatch> {
        match label.to_ascii_lowercase().as_str() {
            "nick" => Some(self.nick.execute(source, args)),
            "hide" => Some(self.hide.execute(source)),
            "unhide" => Some(self.unhide.execute(source, args)),
            "networknick" => match args.first() {
                Some(sub) if sub.eq_ignore_ascii_case("reload") => {
                    Some(self.reload.execute(source))
                }
                _ => None,
            },
            _ => None,
        }
    }

    pub fn complete(&self, source: &CommandSource, label: &str, args: &[&str]) -> Vec<String> {
        match label.to_ascii_lowercase().as_str() {
            "nick" => self.completer.complete(source, args),
            "networknick" => match args {
                [sub] if "reload".starts_with(&sub.to_ascii_lowercase())
                    && self.ctx.allowed(source, &self.ctx.settings().nodes.reload) =>
                {
                    vec!["reload".to_string()]
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::ReloadError;
    use crate::testing::{source, Harness};
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Reloadable for Noop {
        async fn reload(&self) -> Result<(), ReloadError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_routes_known_labels() {
        let h = Harness::new();
        let router = CommandRouter::new(h.ctx.clone(), Arc::new(Noop));
        let steve = h.player("Steve", &["networknick.nick"]);

        let d = router.dispatch(&source(&steve), "NICK", &["Bobby"]).unwrap();
        h.run(d).await;
        assert_eq!(h.stored(steve.identity).await.as_deref(), Some("Bobby"));

        assert!(router.dispatch(&source(&steve), "kick", &[]).is_none());
        assert!(router
            .dispatch(&CommandSource::Console, "networknick", &["status"])
            .is_none());

        let d = router
            .dispatch(&CommandSource::Console, "networknick", &["Reload"])
            .unwrap();
        h.run(d).await;
        assert!(h
            .host
            .last_message_to(&CommandSource::Console)
            .unwrap()
            .contains("reloaded"));
    }

    #[tokio::test]
    async fn test_reload_completion_needs_node() {
        let h = Harness::new();
        let router = CommandRouter::new(h.ctx.clone(), Arc::new(Noop));
        let steve = h.player("Steve", &[]);
        assert!(router.complete(&source(&steve), "networknick", &["re"]).is_empty());
        assert_eq!(
            router.complete(&CommandSource::Console, "networknick", &["re"]),
            vec!["reload"]
        );
    }
}
