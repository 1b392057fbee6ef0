//! # Dependency Container
//!
//! Builds every subsystem from one `NickConfig` and owns their lifecycle.
//!
//! ## Initialization Order
//!
//! 1. Directory (backend + key layout), not yet subscribed
//! 2. Presentation surfaces resolved from the host, presence cache
//! 3. Reconciliation loop, eligibility resolver, hide state machine
//! 4. Command context
//!
//! `start` then subscribes to the change channel and resyncs everyone online.
//!
//! ## Reload
//!
//! Re-reads configuration through the loader, replaces the directory (the old
//! subscription is joined before the new one starts), swaps hide and command
//! settings, then re-applies every online player. Surface selection and the
//! enforcement window are fixed at build time.

use crate::config::{ConfigError, NickConfig};
use async_trait::async_trait;
use nick_types::{ExemptionProvider, HostContext, Identity, PlayerRef};
use nn_02_directory::{
    ConnectionSettings, DirectoryError, DirectoryHandle, KeyValueBackend, NicknameDirectory,
    RedisBackend,
};
use nn_03_presence::{PreConnectCache, PresenceCache, ReconciliationLoop, SurfaceSet};
use nn_04_hide::{EligibilityResolver, HideStateMachine};
use nn_05_commands::{CommandContext, CommandRouter, ReloadError, Reloadable};
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Opens a backend for the configured connection.
pub type BackendFactory = Arc<
    dyn Fn(&ConnectionSettings) -> Result<Arc<dyn KeyValueBackend>, DirectoryError> + Send + Sync,
>;

/// Produces the current configuration (file + environment in production).
pub type ConfigLoader = Arc<dyn Fn() -> Result<NickConfig, ConfigError> + Send + Sync>;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Redis-backed directories.
pub fn redis_backends() -> BackendFactory {
    Arc::new(|settings| {
        let backend: Arc<dyn KeyValueBackend> = Arc::new(RedisBackend::new(settings)?);
        Ok(backend)
    })
}

pub struct NickContainer {
    host: Arc<dyn HostContext>,
    config: RwLock<NickConfig>,
    loader: ConfigLoader,
    backends: BackendFactory,
    directory: Arc<DirectoryHandle>,
    prefetch: Arc<PreConnectCache>,
    presence: Arc<PresenceCache>,
    reconcile: Arc<ReconciliationLoop>,
    hide: Arc<HideStateMachine>,
    commands: Arc<CommandContext>,
}

impl NickContainer {
    pub fn build(
        host: Arc<dyn HostContext>,
        loader: ConfigLoader,
        backends: BackendFactory,
        provider: Option<Arc<dyn ExemptionProvider>>,
        runtime: Handle,
    ) -> Result<Arc<Self>, ContainerError> {
        let config = loader()?;
        info!(
            host = %config.redis.host,
            port = config.redis.port,
            ssl = config.redis.ssl,
            channel = %config.keys.channel,
            "Building nickname runtime"
        );

        let backend = backends(&config.redis)?;
        let directory = Arc::new(DirectoryHandle::new(NicknameDirectory::new(
            backend,
            &config.directory_config(),
        )));

        let surfaces = SurfaceSet::resolve(host.as_ref(), &config.apply);
        if surfaces.is_empty() {
            warn!("No presentation surfaces enabled, nicknames will not be shown");
        }
        let presence = Arc::new(PresenceCache::new(surfaces));
        let prefetch = Arc::new(PreConnectCache::new());
        let reconcile = ReconciliationLoop::new(
            Arc::clone(&host),
            Arc::clone(&presence),
            Arc::clone(&directory),
            Arc::clone(&prefetch),
            config.enforce,
            runtime.clone(),
        );

        let eligibility = Arc::new(EligibilityResolver::new(
            Arc::clone(&host),
            provider,
            config.permissions.exempt.clone(),
            runtime.clone(),
        ));
        let hide = Arc::new(HideStateMachine::new(
            Arc::clone(&directory),
            config.hide.clone(),
            config.max_visible_len(),
        ));
        let commands = Arc::new(CommandContext::new(
            Arc::clone(&host),
            Arc::clone(&directory),
            Arc::clone(&presence),
            eligibility,
            Arc::clone(&hide),
            config.command_settings(),
            runtime,
        ));

        Ok(Arc::new(Self {
            host,
            config: RwLock::new(config),
            loader,
            backends,
            directory,
            prefetch,
            presence,
            reconcile,
            hide,
            commands,
        }))
    }

    /// Subscribe to changes and resync everyone already online.
    pub fn start(&self) -> Result<(), DirectoryError> {
        self.directory.start(self.reconcile.change_listener())?;
        drop(self.reconcile.resync_all());
        info!(
            backend = self.directory.current().backend().name(),
            "Nickname runtime started"
        );
        Ok(())
    }

    /// Stop the subscription. Blocks until its thread has exited.
    pub fn shutdown(&self) {
        self.directory.stop();
        info!("Nickname runtime stopped");
    }

    /// Command entry points, reloading through this container.
    pub fn router(self: &Arc<Self>) -> CommandRouter {
        let reloadable: Arc<dyn Reloadable> = Arc::clone(self) as Arc<dyn Reloadable>;
        CommandRouter::new(Arc::clone(&self.commands), reloadable)
    }

    /// Host pre-connect phase: read ahead so the connect can render at once.
    pub async fn pre_connect(&self, identity: Identity) {
        self.prefetch
            .prefetch(&self.directory.current(), identity)
            .await;
    }

    /// Authoritative thread.
    pub fn on_connect(&self, player: PlayerRef) {
        self.reconcile.on_connect(player);
    }

    /// Authoritative thread.
    pub fn on_disconnect(&self, identity: Identity) {
        self.reconcile.on_disconnect(identity);
    }

    pub fn host(&self) -> &Arc<dyn HostContext> {
        &self.host
    }

    pub fn config(&self) -> NickConfig {
        self.config.read().clone()
    }

    pub fn directory(&self) -> &Arc<DirectoryHandle> {
        &self.directory
    }

    pub fn presence(&self) -> &Arc<PresenceCache> {
        &self.presence
    }

    pub fn reconcile(&self) -> &Arc<ReconciliationLoop> {
        &self.reconcile
    }

    pub fn commands(&self) -> &Arc<CommandContext> {
        &self.commands
    }
}

#[async_trait]
impl Reloadable for NickContainer {
    async fn reload(&self) -> Result<(), ReloadError> {
        let config = (self.loader)().map_err(|e| ReloadError::Config(e.to_string()))?;
        let backend = (self.backends)(&config.redis)?;
        let directory = NicknameDirectory::new(backend, &config.directory_config());

        let handle = Arc::clone(&self.directory);
        tokio::task::spawn_blocking(move || handle.replace(directory))
            .await
            .map_err(|e| ReloadError::Task(e.to_string()))??;

        self.hide
            .reconfigure(config.hide.clone(), config.max_visible_len());
        self.commands.reconfigure(config.command_settings());

        {
            let previous = self.config.read();
            if previous.apply != config.apply || previous.enforce != config.enforce {
                warn!("Surface and enforcement changes take effect after a restart");
            }
        }
        *self.config.write() = config;

        drop(self.reconcile.resync_all());
        Ok(())
    }
}
