//! ReconciliationLoop: converges a connecting session onto the directory value.
//!
//! ```text
//! Connecting ──(prefetched)──► Applied ──► Verifying ──► Enforcing(0..max_runs) ──► Settled
//!      └─────────(none)──────────────────────┘
//! any ──disconnect──► (session removed)
//! ```
//!
//! The directory fetch runs on the tokio runtime; everything that renders is
//! marshalled back onto the host's authoritative thread. Each session carries
//! a generation so a late fetch or timer from an earlier connection of the
//! same identity is ignored.

use crate::cache::PresenceCache;
use crate::config::EnforceConfig;
use crate::prefetch::PreConnectCache;
use nick_types::{ChangeNotification, HostContext, Identity, PlayerRef, TaskId};
use nn_02_directory::{ChangeListener, DirectoryHandle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Where a connected session is in its reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    /// A pre-connect value was rendered optimistically.
    Applied,
    /// Waiting on the authoritative directory read.
    Verifying,
    /// Enforcement runs completed so far.
    Enforcing(u32),
    Settled,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Applied => write!(f, "applied"),
            Self::Verifying => write!(f, "verifying"),
            Self::Enforcing(k) => write!(f, "enforcing({k})"),
            Self::Settled => write!(f, "settled"),
        }
    }
}

struct Session {
    state: SessionState,
    generation: u64,
    timer: Option<TaskId>,
}

pub struct ReconciliationLoop {
    host: Arc<dyn HostContext>,
    presence: Arc<PresenceCache>,
    directory: Arc<DirectoryHandle>,
    prefetch: Arc<PreConnectCache>,
    enforce: EnforceConfig,
    runtime: Handle,
    sessions: Mutex<HashMap<Identity, Session>>,
    generation: AtomicU64,
}

impl ReconciliationLoop {
    pub fn new(
        host: Arc<dyn HostContext>,
        presence: Arc<PresenceCache>,
        directory: Arc<DirectoryHandle>,
        prefetch: Arc<PreConnectCache>,
        enforce: EnforceConfig,
        runtime: Handle,
    ) -> Arc<Self> {
        Arc::new(Self {
            host,
            presence,
            directory,
            prefetch,
            enforce: enforce.normalized(),
            runtime,
            sessions: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        })
    }

    pub fn presence(&self) -> &Arc<PresenceCache> {
        &self.presence
    }

    pub fn state(&self, identity: Identity) -> Option<SessionState> {
        self.sessions.lock().get(&identity).map(|s| s.state)
    }

    /// Snapshot of every tracked session.
    pub fn sessions(&self) -> Vec<(Identity, SessionState)> {
        self.sessions
            .lock()
            .iter()
            .map(|(id, s)| (*id, s.state))
            .collect()
    }

    /// Start reconciling a freshly connected player. Authoritative thread.
    pub fn on_connect(self: &Arc<Self>, player: PlayerRef) {
        let identity = player.identity;
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let previous = self.sessions.lock().insert(
            identity,
            Session {
                state: SessionState::Connecting,
                generation,
                timer: None,
            },
        );
        if let Some(timer) = previous.and_then(|s| s.timer) {
            self.host.cancel_scheduled(timer);
        }

        if let Some(value) = self.prefetch.pop(identity) {
            self.presence.apply(&player, Some(&value));
            self.transition(identity, generation, SessionState::Applied);
        }
        self.transition(identity, generation, SessionState::Verifying);

        let this = Arc::clone(self);
        let directory = self.directory.current();
        self.runtime.spawn(async move {
            let nick = directory.get(identity).await;
            let host = Arc::clone(&this.host);
            host.run_on_authoritative(Box::new(move || {
                this.verified(identity, generation, nick);
            }));
        });
    }

    /// Drop the session: cancel its timer and evict cached state. Idempotent.
    pub fn on_disconnect(&self, identity: Identity) {
        let session = self.sessions.lock().remove(&identity);
        if let Some(timer) = session.and_then(|s| s.timer) {
            self.host.cancel_scheduled(timer);
        }
        self.presence.clear(identity);
        self.prefetch.clear(identity);
    }

    /// Re-apply a directory change for a connected identity, whatever its state.
    /// Safe to call from any thread.
    pub fn on_change_notification(self: &Arc<Self>, notification: ChangeNotification) {
        let this = Arc::clone(self);
        self.host.run_on_authoritative(Box::new(move || {
            this.apply_notification(&notification);
        }));
    }

    /// Listener for `DirectoryHandle::start`. Holds only a weak reference.
    pub fn change_listener(self: &Arc<Self>) -> ChangeListener {
        let weak = Arc::downgrade(self);
        Arc::new(move |notification| {
            if let Some(this) = weak.upgrade() {
                this.on_change_notification(notification);
            }
        })
    }

    /// Fetch every online player's value once and apply it.
    ///
    /// Used on startup and reload so sessions pick up changes made while this
    /// process was not listening.
    pub fn resync_all(self: &Arc<Self>) -> JoinHandle<()> {
        let players = self.host.online_players();
        let this = Arc::clone(self);
        self.runtime.spawn(async move {
            info!(players = players.len(), "Resyncing online players from directory");
            let directory = this.directory.current();
            for player in players {
                let nick = directory.get(player.identity).await;
                let notification = ChangeNotification::new(player.identity, nick);
                this.on_change_notification(notification);
            }
        })
    }

    fn apply_notification(&self, notification: &ChangeNotification) {
        match self.host.connection(notification.identity) {
            Some(player) => self.presence.apply(&player, notification.nick.as_deref()),
            None => debug!(identity = %notification.identity, "Change for offline player ignored"),
        }
    }

    fn verified(self: &Arc<Self>, identity: Identity, generation: u64, nick: Option<String>) {
        if !self.is_current(identity, generation) {
            debug!(%identity, "Discarding stale directory read");
            return;
        }
        let Some(player) = self.host.connection(identity) else {
            self.on_disconnect(identity);
            return;
        };

        self.presence.apply(&player, nick.as_deref());

        if self.enforce.max_runs == 0 {
            self.transition(identity, generation, SessionState::Settled);
            return;
        }
        self.transition(identity, generation, SessionState::Enforcing(0));

        let weak = Arc::downgrade(self);
        let period = self.enforce.period_ticks;
        let timer = self.host.schedule_repeating(
            period,
            period,
            Box::new(move || {
                if let Some(this) = weak.upgrade() {
                    this.enforce_tick(identity, generation);
                }
            }),
        );

        let orphaned = {
            let mut sessions = self.sessions.lock();
            match sessions.get_mut(&identity) {
                Some(s) if s.generation == generation => {
                    s.timer = Some(timer);
                    false
                }
                _ => true,
            }
        };
        if orphaned {
            self.host.cancel_scheduled(timer);
        }
    }

    fn enforce_tick(&self, identity: Identity, generation: u64) {
        let run = {
            let sessions = self.sessions.lock();
            match sessions.get(&identity) {
                Some(Session {
                    state: SessionState::Enforcing(k),
                    generation: g,
                    ..
                }) if *g == generation => *k,
                _ => return,
            }
        };

        let Some(player) = self.host.connection(identity) else {
            self.on_disconnect(identity);
            return;
        };

        let desired = self.presence.get_visible(identity, &player.name);
        if self.presence.surfaces().drifted(identity, &desired) {
            debug!(%identity, run, "Rendered name drifted, re-applying");
            self.presence.rerender(&player);
        }

        let next = run + 1;
        let finished_timer = {
            let mut sessions = self.sessions.lock();
            match sessions.get_mut(&identity) {
                Some(s) if s.generation == generation => {
                    if next >= self.enforce.max_runs {
                        s.state = SessionState::Settled;
                        s.timer.take()
                    } else {
                        s.state = SessionState::Enforcing(next);
                        None
                    }
                }
                _ => None,
            }
        };
        if let Some(timer) = finished_timer {
            debug!(%identity, "Enforcement settled");
            self.host.cancel_scheduled(timer);
        }
    }

    fn is_current(&self, identity: Identity, generation: u64) -> bool {
        self.sessions
            .lock()
            .get(&identity)
            .is_some_and(|s| s.generation == generation)
    }

    fn transition(&self, identity: Identity, generation: u64, state: SessionState) {
        if let Some(s) = self.sessions.lock().get_mut(&identity) {
            if s.generation == generation {
                s.state = state;
            }
        }
    }
}
