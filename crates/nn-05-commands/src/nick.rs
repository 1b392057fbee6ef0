//! `/nick <name|off|reset|clear>` and `/nick <playerOrNick> <name|off|reset|clear>`.
//!
//! Both forms share one planning step; they differ only in the permission
//! nodes consulted and whether the target passes the exemption gate.

use crate::context::{CommandContext, Dispatch, PlayerCapabilities};
use crate::messages::MessageKey;
use crate::target::TargetResolver;
use nick_types::{CommandSource, NickError, PlayerRef};
use std::sync::Arc;
use tracing::info;

pub const CLEAR_WORDS: [&str; 3] = ["off", "reset", "clear"];

pub fn is_clear_word(s: &str) -> bool {
    CLEAR_WORDS.iter().any(|w| w.eq_ignore_ascii_case(s.trim()))
}

/// What the command will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NickChange {
    Clear,
    Set(String),
}

/// Self or other: which nodes gate the change and who receives it.
#[derive(Debug, Clone)]
enum Strategy {
    OnSelf,
    OnOther(PlayerRef),
}

pub struct NickCommand {
    ctx: Arc<CommandContext>,
}

impl NickCommand {
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        Self { ctx }
    }

    /// Authoritative thread.
    pub fn execute(&self, source: &CommandSource, args: &[&str]) -> Dispatch {
        let Some(actor) = source.player().cloned() else {
            self.ctx.reply_error(source, &NickError::PlayersOnly);
            return Dispatch::Done;
        };
        let nodes = self.ctx.settings().nodes.clone();
        if !self.ctx.allowed(source, &nodes.nick) {
            self.ctx.reply(source, MessageKey::NoPermission, &[]);
            return Dispatch::Done;
        }

        let (strategy, value) = match args {
            [] => {
                self.ctx.reply(source, MessageKey::Usage, &[]);
                return Dispatch::Done;
            }
            [value] => (Strategy::OnSelf, *value),
            [target, value, ..] => {
                let resolver = TargetResolver::new(self.ctx.host.as_ref(), &self.ctx.presence);
                match resolver.resolve(target) {
                    Ok(p) => (Strategy::OnOther(p), *value),
                    Err(e) => {
                        self.ctx.reply_error(source, &e);
                        return Dispatch::Done;
                    }
                }
            }
        };

        let (clear_node, set_node) = match strategy {
            Strategy::OnSelf => (&nodes.nick_clear, &nodes.nick),
            Strategy::OnOther(_) => (&nodes.nick_others_clear, &nodes.nick_others),
        };

        let change = match self.plan(&actor, value, clear_node, set_node) {
            Ok(change) => change,
            Err(None) => {
                self.ctx.reply(source, MessageKey::NoPermission, &[]);
                return Dispatch::Done;
            }
            Err(Some(e)) => {
                self.ctx.reply_error(source, &e);
                return Dispatch::Done;
            }
        };

        let ctx = Arc::clone(&self.ctx);
        let source = source.clone();
        self.ctx.spawn(async move {
            let target = match strategy {
                Strategy::OnSelf => actor.clone(),
                Strategy::OnOther(target) => {
                    if target.identity != actor.identity
                        && ctx.eligibility.resolve(target.identity).await
                    {
                        ctx.reply_error(&source, &NickError::TargetExempt);
                        return;
                    }
                    target
                }
            };
            apply_change(&ctx, &source, &actor, &target, change).await;
        })
    }

    /// Permission and validation checks. `Err(None)` means a command node is missing.
    fn plan(
        &self,
        actor: &PlayerRef,
        value: &str,
        clear_node: &str,
        set_node: &str,
    ) -> Result<NickChange, Option<NickError>> {
        let source = CommandSource::Player(actor.clone());
        if is_clear_word(value) {
            return if self.ctx.allowed(&source, clear_node) {
                Ok(NickChange::Clear)
            } else {
                Err(None)
            };
        }
        if !self.ctx.allowed(&source, set_node) {
            return Err(None);
        }

        let settings = self.ctx.settings();
        let caps = PlayerCapabilities::new(self.ctx.host.as_ref(), actor.identity);
        settings
            .validator
            .accept(&caps, value, settings.max_visible_len)
            .map(|nick| NickChange::Set(nick.into_raw()))
            .map_err(|e| Some(e.into()))
    }
}

async fn apply_change(
    ctx: &CommandContext,
    source: &CommandSource,
    actor: &PlayerRef,
    target: &PlayerRef,
    change: NickChange,
) {
    let directory = ctx.directory.current();
    let on_self = target.identity == actor.identity;

    match change {
        NickChange::Clear => {
            directory.set(target.identity, None).await;
            directory.clear_prior(target.identity).await;
            info!(actor = %actor.identity, target = %target.identity, "Nickname cleared");
            if on_self {
                ctx.reply(source, MessageKey::NickCleared, &[]);
            } else {
                ctx.reply(source, MessageKey::NickClearedOther, &[("target", &target.name)]);
            }
        }
        NickChange::Set(nick) => {
            directory.set(target.identity, Some(&nick)).await;
            info!(actor = %actor.identity, target = %target.identity, "Nickname set");
            if on_self {
                ctx.reply(source, MessageKey::NickSet, &[("nick", &nick)]);
            } else {
                ctx.reply(
                    source,
                    MessageKey::NickSetOther,
                    &[("target", &target.name), ("nick", &nick)],
                );
            }
        }
    }
}
