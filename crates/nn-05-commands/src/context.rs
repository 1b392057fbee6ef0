//! Shared collaborators and helpers for every command entry point.

use crate::messages::{MessageCatalog, MessageKey};
use crate::permissions::PermissionNodes;
use nick_types::{CommandSource, HostContext, Identity, NickError};
use nn_01_text_codec::{CapabilityCheck, NicknameValidator};
use nn_02_directory::DirectoryHandle;
use nn_03_presence::PresenceCache;
use nn_04_hide::{EligibilityResolver, HideStateMachine};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

/// Reloadable command settings.
#[derive(Debug, Clone)]
pub struct CommandSettings {
    pub validator: NicknameValidator,
    pub max_visible_len: usize,
    pub messages: MessageCatalog,
    pub nodes: PermissionNodes,
}

impl CommandSettings {
    pub fn new(nodes: PermissionNodes, messages: MessageCatalog, max_visible_len: usize) -> Self {
        Self {
            validator: NicknameValidator::new(nodes.style.clone()),
            max_visible_len,
            messages,
            nodes,
        }
    }
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self::new(
            PermissionNodes::default(),
            MessageCatalog::default(),
            nn_01_text_codec::DEFAULT_MAX_VISIBLE_LEN,
        )
    }
}

/// What a command left running after returning to the host.
#[must_use]
pub enum Dispatch {
    /// Finished synchronously.
    Done,
    /// Directory or provider work still in flight.
    Pending(JoinHandle<()>),
}

impl Dispatch {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Wait for in-flight work. Replies may still be queued for the
    /// authoritative thread afterwards.
    pub async fn finished(self) {
        if let Self::Pending(handle) = self {
            if let Err(e) = handle.await {
                warn!(error = %e, "Command task failed");
            }
        }
    }
}

/// Validator capability check backed by the host's online permissions.
pub struct PlayerCapabilities<'a> {
    host: &'a dyn HostContext,
    identity: Identity,
}

impl<'a> PlayerCapabilities<'a> {
    pub fn new(host: &'a dyn HostContext, identity: Identity) -> Self {
        Self { host, identity }
    }
}

impl CapabilityCheck for PlayerCapabilities<'_> {
    fn has_capability(&self, node: &str) -> bool {
        self.host.has_permission(self.identity, node)
    }
}

pub struct CommandContext {
    pub(crate) host: Arc<dyn HostContext>,
    pub(crate) directory: Arc<DirectoryHandle>,
    pub(crate) presence: Arc<PresenceCache>,
    pub(crate) eligibility: Arc<EligibilityResolver>,
    pub(crate) hide: Arc<HideStateMachine>,
    settings: RwLock<Arc<CommandSettings>>,
    runtime: Handle,
}

impl CommandContext {
    pub fn new(
        host: Arc<dyn HostContext>,
        directory: Arc<DirectoryHandle>,
        presence: Arc<PresenceCache>,
        eligibility: Arc<EligibilityResolver>,
        hide: Arc<HideStateMachine>,
        settings: CommandSettings,
        runtime: Handle,
    ) -> Self {
        Self {
            host,
            directory,
            presence,
            eligibility,
            hide,
            settings: RwLock::new(Arc::new(settings)),
            runtime,
        }
    }

    pub fn settings(&self) -> Arc<CommandSettings> {
        self.settings.read().clone()
    }

    pub fn reconfigure(&self, settings: CommandSettings) {
        *self.settings.write() = Arc::new(settings);
    }

    pub fn host(&self) -> &Arc<dyn HostContext> {
        &self.host
    }

    /// Console may do anything; players need `node`.
    pub fn allowed(&self, source: &CommandSource, node: &str) -> bool {
        match source {
            CommandSource::Console => true,
            CommandSource::Player(p) => self.host.has_permission(p.identity, node),
        }
    }

    /// Send a catalog message on the authoritative thread. Blank templates send nothing.
    pub fn reply(&self, to: &CommandSource, key: MessageKey, vars: &[(&str, &str)]) {
        let Some(message) = self.settings().messages.render(key, vars) else {
            return;
        };
        let host = Arc::clone(&self.host);
        let to = to.clone();
        self.host
            .run_on_authoritative(Box::new(move || host.send_message(&to, &message)));
    }

    pub fn reply_error(&self, to: &CommandSource, err: &NickError) {
        let (key, vars) = MessageCatalog::for_error(err);
        let vars: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.reply(to, key, &vars);
    }

    pub(crate) fn spawn<F>(&self, task: F) -> Dispatch
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Dispatch::Pending(self.runtime.spawn(task))
    }
}
