//! Shared fixture for command tests: a manual host over an in-memory directory.

use crate::context::{CommandContext, CommandSettings, Dispatch};
use crate::hide::{HideCommand, UnhideCommand};
use crate::nick::NickCommand;
use nick_types::test_utils::ManualHost;
use nick_types::{CommandSource, HostContext, Identity, PlayerRef};
use nn_02_directory::{DirectoryConfig, DirectoryHandle, MemoryBackend, NicknameDirectory};
use nn_03_presence::{PresenceCache, SurfaceSet};
use nn_04_hide::{EligibilityResolver, HideConfig, HideStateMachine, DEFAULT_EXEMPT_NODE};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

pub(crate) fn source(player: &PlayerRef) -> CommandSource {
    CommandSource::Player(player.clone())
}

pub(crate) struct Harness {
    pub host: Arc<ManualHost>,
    pub directory: Arc<DirectoryHandle>,
    pub presence: Arc<PresenceCache>,
    pub ctx: Arc<CommandContext>,
    pub nick: NickCommand,
    pub hide: HideCommand,
    pub unhide: UnhideCommand,
}

impl Harness {
    /// Must be called inside a tokio runtime.
    pub fn new() -> Self {
        let host = Arc::new(ManualHost::new());
        let dyn_host: Arc<dyn HostContext> = host.clone();
        let directory = Arc::new(DirectoryHandle::new(NicknameDirectory::new(
            Arc::new(MemoryBackend::new()),
            &DirectoryConfig::default(),
        )));
        let presence = Arc::new(PresenceCache::new(SurfaceSet::default()));
        let eligibility = Arc::new(EligibilityResolver::new(
            dyn_host.clone(),
            None,
            DEFAULT_EXEMPT_NODE,
            Handle::current(),
        ));
        let hide = Arc::new(HideStateMachine::new(
            directory.clone(),
            HideConfig::default(),
            16,
        ));
        let ctx = Arc::new(CommandContext::new(
            dyn_host,
            directory.clone(),
            presence.clone(),
            eligibility,
            hide,
            CommandSettings::default(),
            Handle::current(),
        ));

        Self {
            host,
            directory,
            presence,
            nick: NickCommand::new(ctx.clone()),
            hide: HideCommand::new(ctx.clone()),
            unhide: UnhideCommand::new(ctx.clone()),
            ctx,
        }
    }

    /// Connect a player holding `nodes`.
    pub fn player(&self, name: &str, nodes: &[&str]) -> PlayerRef {
        let p = PlayerRef::new(Identity::random(), name);
        self.host.connect(p.clone());
        for node in nodes {
            self.host.grant(p.identity, node);
        }
        p
    }

    /// Drive a dispatch to completion, then deliver queued replies.
    pub async fn run(&self, dispatch: Dispatch) {
        if let Dispatch::Pending(handle) = &dispatch {
            let done = self
                .host
                .run_until(Duration::from_secs(5), || handle.is_finished())
                .await;
            assert!(done, "command did not finish");
        }
        dispatch.finished().await;
        self.host.run_pending();
    }

    pub async fn stored(&self, identity: Identity) -> Option<String> {
        self.directory.current().get(identity).await
    }

    pub fn last_reply(&self, player: &PlayerRef) -> Option<String> {
        self.host.last_message_to(&source(player))
    }

    pub fn set_max_len(&self, max_visible_len: usize) {
        let mut settings = (*self.ctx.settings()).clone();
        settings.max_visible_len = max_visible_len;
        self.ctx.reconfigure(settings);
    }
}
