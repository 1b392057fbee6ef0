//! `/hide` and `/unhide [player]`.

use crate::context::{CommandContext, Dispatch};
use crate::messages::MessageKey;
use crate::target::TargetResolver;
use nick_types::{CommandSource, NickError, PlayerRef};
use nn_04_hide::{HideError, HideOutcome};
use std::sync::Arc;
use tracing::info;

/// `/hide`: toggle the actor's own hidden state.
pub struct HideCommand {
    ctx: Arc<CommandContext>,
}

impl HideCommand {
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, source: &CommandSource) -> Dispatch {
        let Some(actor) = source.player().cloned() else {
            self.ctx.reply_error(source, &NickError::PlayersOnly);
            return Dispatch::Done;
        };
        if !self.ctx.allowed(source, &self.ctx.settings().nodes.hide) {
            self.ctx.reply(source, MessageKey::NoPermission, &[]);
            return Dispatch::Done;
        }

        let ctx = Arc::clone(&self.ctx);
        let source = source.clone();
        self.ctx.spawn(async move {
            let outcome = ctx.hide.toggle(actor.identity).await;
            report_own(&ctx, &source, &actor, outcome);
        })
    }
}

/// `/unhide` on oneself, or `/unhide <player>` on someone else.
pub struct UnhideCommand {
    ctx: Arc<CommandContext>,
}

impl UnhideCommand {
    pub fn new(ctx: Arc<CommandContext>) -> Self {
        Self { ctx }
    }

    pub fn execute(&self, source: &CommandSource, args: &[&str]) -> Dispatch {
        match args.first() {
            None => self.unhide_self(source),
            Some(target) => self.unhide_other(source, target),
        }
    }

    fn unhide_self(&self, source: &CommandSource) -> Dispatch {
        let Some(actor) = source.player().cloned() else {
            self.ctx.reply_error(source, &NickError::PlayersOnly);
            return Dispatch::Done;
        };
        let nodes = self.ctx.settings().nodes.clone();
        if !self.ctx.allowed(source, &nodes.unhide) {
            self.ctx.reply(source, MessageKey::NoPermission, &[]);
            return Dispatch::Done;
        }
        // Not hidden: /unhide behaves like /hide for those allowed to hide.
        let may_hide = self.ctx.allowed(source, &nodes.hide);

        let ctx = Arc::clone(&self.ctx);
        let source = source.clone();
        self.ctx.spawn(async move {
            match ctx.hide.unhide(actor.identity).await {
                Ok(outcome) => report_own(&ctx, &source, &actor, outcome),
                Err(HideError::NotHidden) if may_hide => {
                    let outcome = ctx.hide.hide(actor.identity).await;
                    report_own(&ctx, &source, &actor, outcome);
                }
                Err(HideError::NotHidden) => ctx.reply(&source, MessageKey::NoPermission, &[]),
            }
        })
    }

    fn unhide_other(&self, source: &CommandSource, input: &str) -> Dispatch {
        if !self
            .ctx
            .allowed(source, &self.ctx.settings().nodes.unhide_others)
        {
            self.ctx.reply(source, MessageKey::NoPermission, &[]);
            return Dispatch::Done;
        }
        let resolver = TargetResolver::new(self.ctx.host.as_ref(), &self.ctx.presence);
        let target = match resolver.resolve(input) {
            Ok(target) => target,
            Err(e) => {
                self.ctx.reply_error(source, &e);
                return Dispatch::Done;
            }
        };
        let on_self = source
            .player()
            .is_some_and(|actor| actor.identity == target.identity);

        let ctx = Arc::clone(&self.ctx);
        let source = source.clone();
        self.ctx.spawn(async move {
            if !on_self && ctx.eligibility.resolve(target.identity).await {
                ctx.reply_error(&source, &NickError::TargetExempt);
                return;
            }
            match ctx.hide.unhide(target.identity).await {
                Ok(HideOutcome::Unhidden {
                    restored: Some(nick),
                }) => {
                    info!(target = %target.identity, "Unhid player");
                    ctx.reply(
                        &source,
                        MessageKey::UnhidOther,
                        &[("target", &target.name), ("nick", &nick)],
                    );
                }
                Ok(_) => {
                    info!(target = %target.identity, "Unhid player to real name");
                    ctx.reply(
                        &source,
                        MessageKey::UnhidOtherNormal,
                        &[("target", &target.name)],
                    );
                }
                Err(e) => ctx.reply_error(&source, &NickError::from(e)),
            }
        })
    }
}

fn report_own(ctx: &CommandContext, source: &CommandSource, actor: &PlayerRef, outcome: HideOutcome) {
    match outcome {
        HideOutcome::Hidden { value } => {
            info!(player = %actor.identity, "Player hidden");
            ctx.reply(source, MessageKey::HideSet, &[("nick", &value)]);
        }
        HideOutcome::Unhidden { restored } => {
            info!(player = %actor.identity, "Player unhidden");
            let shown = restored.unwrap_or_else(|| actor.name.clone());
            ctx.reply(source, MessageKey::Unhide, &[("nick", &shown)]);
        }
    }
}
