//! Test utilities for the host ports.
//!
//! `ManualHost` is a deterministic `HostContext`: work posted to the
//! authoritative thread queues until the test drains it, and repeating tasks
//! only fire when the test advances the clock. Enable with the `test-utils`
//! feature flag.
//!
//! ```rust
//! use nick_types::test_utils::ManualHost;
//! use nick_types::{HostContext, Identity, PlayerRef};
//!
//! let host = ManualHost::new();
//! let steve = PlayerRef::new(Identity::random(), "Steve");
//! host.connect(steve.clone());
//! assert!(host.is_connected(steve.identity));
//! ```

use crate::entities::{CommandSource, Identity, PlayerRef, TaskId, Ticks};
use crate::errors::SurfaceError;
use crate::host::{AuthoritativeTask, HostContext, PresentationSurface, RepeatingTask, SurfaceKind};
use parking_lot::Mutex;
use std::cell::Cell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Grants every node.
pub const ALL_PERMISSIONS: &str = "*";

thread_local! {
    static ON_AUTHORITATIVE: Cell<bool> = const { Cell::new(false) };
}

struct Timer {
    next_due: Ticks,
    period: Ticks,
    task: RepeatingTask,
}

/// Host double driven explicitly by the test.
#[derive(Default)]
pub struct ManualHost {
    queue: Mutex<VecDeque<AuthoritativeTask>>,
    timers: Mutex<HashMap<u64, Timer>>,
    /// Timers taken out to run, flagged when cancelled meanwhile.
    in_flight: Mutex<HashMap<u64, bool>>,
    next_task: AtomicU64,
    now: AtomicU64,
    online: Mutex<Vec<PlayerRef>>,
    known: Mutex<Vec<PlayerRef>>,
    permissions: Mutex<HashMap<Identity, HashSet<String>>>,
    messages: Mutex<Vec<(CommandSource, String)>>,
    surfaces: Mutex<Vec<Arc<dyn PresentationSurface>>>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surfaces(surfaces: Vec<Arc<dyn PresentationSurface>>) -> Self {
        let host = Self::default();
        *host.surfaces.lock() = surfaces;
        host
    }

    /// Mark `player` online (and known).
    pub fn connect(&self, player: PlayerRef) {
        self.remember(player.clone());
        let mut online = self.online.lock();
        online.retain(|p| p.identity != player.identity);
        online.push(player);
    }

    pub fn disconnect(&self, identity: Identity) {
        self.online.lock().retain(|p| p.identity != identity);
    }

    /// Known but not necessarily online.
    pub fn remember(&self, player: PlayerRef) {
        let mut known = self.known.lock();
        known.retain(|p| p.identity != player.identity);
        known.push(player);
    }

    pub fn grant(&self, identity: Identity, node: &str) {
        self.permissions
            .lock()
            .entry(identity)
            .or_default()
            .insert(node.to_string());
    }

    pub fn grant_all(&self, identity: Identity) {
        self.grant(identity, ALL_PERMISSIONS);
    }

    pub fn revoke(&self, identity: Identity, node: &str) {
        if let Some(nodes) = self.permissions.lock().get_mut(&identity) {
            nodes.remove(node);
        }
    }

    /// Every message sent so far, oldest first.
    pub fn messages(&self) -> Vec<(CommandSource, String)> {
        self.messages.lock().clone()
    }

    /// Messages sent to `to`, oldest first.
    pub fn messages_to(&self, to: &CommandSource) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(src, _)| src == to)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn last_message_to(&self, to: &CommandSource) -> Option<String> {
        self.messages_to(to).pop()
    }

    /// Tasks waiting for the authoritative thread.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Live repeating tasks.
    pub fn scheduled(&self) -> usize {
        self.timers.lock().len()
    }

    pub fn now(&self) -> Ticks {
        self.now.load(Ordering::Acquire)
    }

    /// Run `f` as if on the authoritative thread.
    pub fn on_authoritative<R>(&self, f: impl FnOnce() -> R) -> R {
        let was = ON_AUTHORITATIVE.with(|flag| flag.replace(true));
        let out = f();
        ON_AUTHORITATIVE.with(|flag| flag.set(was));
        out
    }

    /// Drain the authoritative queue, including work queued while draining.
    /// Returns how many tasks ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.queue.lock().pop_front();
            match next {
                Some(task) => {
                    self.on_authoritative(task);
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Advance the clock tick by tick, firing due repeating tasks.
    pub fn advance(&self, ticks: Ticks) {
        for _ in 0..ticks {
            let now = self.now.fetch_add(1, Ordering::AcqRel) + 1;
            self.run_pending();

            let due: Vec<u64> = self
                .timers
                .lock()
                .iter()
                .filter(|(_, t)| t.next_due <= now)
                .map(|(id, _)| *id)
                .collect();

            for id in due {
                // Taken out while running so the task may cancel itself.
                let timer = {
                    let mut timers = self.timers.lock();
                    let timer = timers.remove(&id);
                    if timer.is_some() {
                        self.in_flight.lock().insert(id, false);
                    }
                    timer
                };
                if let Some(mut timer) = timer {
                    self.on_authoritative(|| (timer.task)());
                    timer.next_due = now + timer.period.max(1);
                    let mut timers = self.timers.lock();
                    if !self.in_flight.lock().remove(&id).unwrap_or(false) {
                        timers.insert(id, timer);
                    }
                }
            }
            self.run_pending();
        }
    }

    /// Drain the queue until `done` holds, yielding to the runtime between
    /// attempts. Returns whether `done` held before `timeout`.
    pub async fn run_until(&self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_pending();
            if done() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl HostContext for ManualHost {
    fn run_on_authoritative(&self, task: AuthoritativeTask) {
        if self.is_authoritative_thread() {
            task();
        } else {
            self.queue.lock().push_back(task);
        }
    }

    fn is_authoritative_thread(&self) -> bool {
        ON_AUTHORITATIVE.with(Cell::get)
    }

    fn schedule_repeating(&self, delay: Ticks, period: Ticks, task: RepeatingTask) -> TaskId {
        let id = self.next_task.fetch_add(1, Ordering::AcqRel) + 1;
        let timer = Timer {
            next_due: self.now() + delay.max(1),
            period,
            task,
        };
        self.timers.lock().insert(id, timer);
        TaskId(id)
    }

    fn cancel_scheduled(&self, id: TaskId) {
        let mut timers = self.timers.lock();
        if timers.remove(&id.0).is_none() {
            // Possibly running right now; keep it from being re-armed.
            if let Some(cancelled) = self.in_flight.lock().get_mut(&id.0) {
                *cancelled = true;
            }
        }
    }

    fn is_connected(&self, identity: Identity) -> bool {
        self.online.lock().iter().any(|p| p.identity == identity)
    }

    fn connection(&self, identity: Identity) -> Option<PlayerRef> {
        self.online
            .lock()
            .iter()
            .find(|p| p.identity == identity)
            .cloned()
    }

    fn online_players(&self) -> Vec<PlayerRef> {
        self.online.lock().clone()
    }

    fn find_online_by_name(&self, name: &str) -> Option<PlayerRef> {
        self.online
            .lock()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn offline_player(&self, name: &str) -> Option<PlayerRef> {
        self.known
            .lock()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn offline_player_by_id(&self, identity: Identity) -> Option<PlayerRef> {
        self.known
            .lock()
            .iter()
            .find(|p| p.identity == identity)
            .cloned()
    }

    fn has_permission(&self, identity: Identity, node: &str) -> bool {
        if !self.is_connected(identity) {
            return false;
        }
        self.permissions
            .lock()
            .get(&identity)
            .is_some_and(|nodes| nodes.contains(node) || nodes.contains(ALL_PERMISSIONS))
    }

    fn send_message(&self, to: &CommandSource, message: &str) {
        self.messages.lock().push((to.clone(), message.to_string()));
    }

    fn available_surfaces(&self) -> Vec<Arc<dyn PresentationSurface>> {
        self.surfaces.lock().clone()
    }
}

/// In-memory presentation surface that records what it was asked to show.
pub struct RecordingSurface {
    kind: SurfaceKind,
    observable: bool,
    values: Mutex<HashMap<Identity, String>>,
    presents: AtomicUsize,
    failing: AtomicBool,
    reject_native: AtomicBool,
}

impl RecordingSurface {
    pub fn new(kind: SurfaceKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            observable: true,
            values: Mutex::new(HashMap::new()),
            presents: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            reject_native: AtomicBool::new(false),
        })
    }

    /// A surface whose current value cannot be read back.
    pub fn write_only(kind: SurfaceKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            observable: false,
            values: Mutex::new(HashMap::new()),
            presents: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            reject_native: AtomicBool::new(false),
        })
    }

    pub fn value(&self, identity: Identity) -> Option<String> {
        self.values.lock().get(&identity).cloned()
    }

    /// Successful `present` calls so far.
    pub fn present_count(&self) -> usize {
        self.presents.load(Ordering::Acquire)
    }

    /// Make every call fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Refuse values carrying the native escape marker.
    pub fn set_reject_native(&self, reject: bool) {
        self.reject_native.store(reject, Ordering::Release);
    }

    /// Simulate another component overwriting the rendered name.
    pub fn overwrite(&self, identity: Identity, value: &str) {
        self.values.lock().insert(identity, value.to_string());
    }
}

impl PresentationSurface for RecordingSurface {
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn present(&self, identity: Identity, value: &str) -> Result<(), SurfaceError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(SurfaceError::new(self.kind.as_str(), "surface offline"));
        }
        if self.reject_native.load(Ordering::Acquire) && value.contains('\u{00A7}') {
            return Err(SurfaceError::new(self.kind.as_str(), "native markers rejected"));
        }
        self.values.lock().insert(identity, value.to_string());
        self.presents.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn current(&self, identity: Identity) -> Result<Option<String>, SurfaceError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(SurfaceError::new(self.kind.as_str(), "surface offline"));
        }
        if !self.observable {
            return Ok(None);
        }
        Ok(self.values.lock().get(&identity).cloned())
    }
}
