//! # Multi-Process Fixture
//!
//! A `Network` owns the shared directory store. Each `Process` is one server
//! of the network: its own host double, recording surface and container,
//! subscribed to the shared change channel.

use nick_types::test_utils::{ManualHost, RecordingSurface};
use nick_types::{CommandSource, Identity, PlayerRef, PresentationSurface, SurfaceKind};
use nn_01_text_codec::to_native;
use nn_02_directory::{encode_update, KeyValueBackend, MemoryBackend};
use nn_03_presence::SessionState;
use nn_05_commands::CommandRouter;
use nn_runtime::{BackendFactory, ConfigLoader, NickConfig, NickContainer};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Upper bound for anything crossing the change channel.
pub const WAIT: Duration = Duration::from_secs(3);

pub struct Network {
    backend: MemoryBackend,
    config: Arc<Mutex<NickConfig>>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        let mut config = NickConfig::default();
        config.subscription.backoff_ms = 100;
        Self {
            backend: MemoryBackend::new(),
            config: Arc::new(Mutex::new(config)),
        }
    }

    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }

    /// Change the configuration every process loads on its next reload.
    pub fn configure(&self, f: impl FnOnce(&mut NickConfig)) {
        f(&mut self.config.lock());
    }

    fn channel(&self) -> String {
        self.config.lock().keys.channel.clone()
    }

    /// Build, start and wait for one process to be listening.
    ///
    /// Needs a multi-thread runtime: the subscription and directory calls
    /// block on worker threads.
    pub async fn process(&self) -> Process {
        let surface = RecordingSurface::new(SurfaceKind::DisplayName);
        let surfaces: Vec<Arc<dyn PresentationSurface>> = vec![surface.clone()];
        let host = Arc::new(ManualHost::with_surfaces(surfaces));

        let loader: ConfigLoader = {
            let config = self.config.clone();
            Arc::new(move || Ok(config.lock().clone()))
        };
        let backends: BackendFactory = {
            let backend = self.backend.clone();
            Arc::new(move |_| {
                let b: Arc<dyn KeyValueBackend> = Arc::new(backend.clone());
                Ok(b)
            })
        };

        let channel = self.channel();
        let listening = self.backend.subscriber_count(&channel) + 1;
        let container = NickContainer::build(host.clone(), loader, backends, None, Handle::current())
            .expect("container builds");
        container.start().expect("subscription starts");

        let backend = self.backend.clone();
        assert!(
            host.run_until(WAIT, || backend.subscriber_count(&channel) >= listening)
                .await,
            "process never subscribed"
        );

        let router = container.router();
        Process {
            host,
            surface,
            container,
            router,
        }
    }

    /// Wait until exactly `expected` processes listen on the change channel.
    ///
    /// Stale listeners left by a reload are only dropped on publish, so this
    /// keeps publishing a change for an identity nobody has online.
    pub async fn wait_listeners(&self, process: &Process, expected: usize) -> bool {
        let channel = self.channel();
        let payload = encode_update(Identity::random(), None);
        let backend = self.backend.clone();
        process
            .host
            .run_until(WAIT, || {
                backend.announce(&channel, &payload);
                backend.subscriber_count(&channel) == expected
            })
            .await
    }

    /// Directory value as any process would read it.
    pub fn stored(&self, identity: Identity) -> Option<String> {
        let key = self.config.lock().keys.nick_key(identity);
        self.backend.peek(&key)
    }

    pub fn stored_prior(&self, identity: Identity) -> Option<String> {
        let key = self.config.lock().keys.prior_key(identity);
        self.backend.peek(&key)
    }
}

pub struct Process {
    pub host: Arc<ManualHost>,
    pub surface: Arc<RecordingSurface>,
    pub container: Arc<NickContainer>,
    pub router: CommandRouter,
}

impl Process {
    /// Connect `player` the way a host would: pre-connect read, then the
    /// connect event. Returns once the authoritative read has been applied.
    pub async fn join(&self, player: &PlayerRef) {
        self.container.pre_connect(player.identity).await;
        self.host.connect(player.clone());
        self.host
            .on_authoritative(|| self.container.on_connect(player.clone()));

        let reconcile = self.container.reconcile().clone();
        let identity = player.identity;
        assert!(
            self.host
                .run_until(WAIT, || matches!(
                    reconcile.state(identity),
                    Some(SessionState::Enforcing(_) | SessionState::Settled)
                ))
                .await,
            "{} never finished connecting",
            player.name
        );
    }

    pub fn leave(&self, identity: Identity) {
        self.host
            .on_authoritative(|| self.container.on_disconnect(identity));
        self.host.disconnect(identity);
    }

    /// Run a command as `player` (console when `None`) and wait for its
    /// directory work and replies.
    pub async fn command(&self, player: Option<&PlayerRef>, label: &str, args: &[&str]) {
        let source = source(player);
        let dispatch = self
            .host
            .on_authoritative(|| self.router.dispatch(&source, label, args))
            .unwrap_or_else(|| panic!("/{label} is not routed"));
        dispatch.finished().await;
        self.host.run_pending();
    }

    pub fn last_reply(&self, player: Option<&PlayerRef>) -> Option<String> {
        self.host.last_message_to(&source(player))
    }

    /// What the surface currently renders.
    pub fn shown(&self, identity: Identity) -> Option<String> {
        self.surface.value(identity)
    }

    /// Mirrored directory value.
    pub fn cached(&self, identity: Identity) -> Option<String> {
        self.container.presence().get_stored(identity)
    }

    /// Wait until the surface renders `raw`.
    pub async fn wait_shown(&self, identity: Identity, raw: &str) -> bool {
        let expected = to_native(raw);
        let surface = self.surface.clone();
        self.host
            .run_until(WAIT, || surface.value(identity).as_deref() == Some(expected.as_str()))
            .await
    }

    /// Wait until the cached directory value is `expected`.
    pub async fn wait_cached(&self, identity: Identity, expected: Option<&str>) -> bool {
        let presence = self.container.presence().clone();
        self.host
            .run_until(WAIT, || presence.get_stored(identity).as_deref() == expected)
            .await
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        self.container.shutdown();
    }
}

pub fn source(player: Option<&PlayerRef>) -> CommandSource {
    match player {
        Some(p) => CommandSource::Player(p.clone()),
        None => CommandSource::Console,
    }
}

pub fn player(name: &str) -> PlayerRef {
    PlayerRef::new(Identity::random(), name)
}
