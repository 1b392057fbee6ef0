//! Development host.
//!
//! Stands in for a game server: one named authoritative thread fed by a
//! channel, a 50 ms tick driving repeating tasks, in-memory players and
//! permissions, and three surfaces that log what they render.

use nick_types::{
    AuthoritativeTask, CommandSource, HostContext, Identity, PlayerRef, PresentationSurface,
    RepeatingTask, SurfaceError, SurfaceKind, TaskId, Ticks,
};
use nn_01_text_codec::strip;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const TICK: Duration = Duration::from_millis(50);

/// Grants every node.
pub const ALL_PERMISSIONS: &str = "*";

enum Job {
    Run(AuthoritativeTask),
    Stop,
}

struct Timer {
    next_due: Ticks,
    period: Ticks,
    task: RepeatingTask,
}

#[derive(Default)]
struct Scheduler {
    timers: Mutex<HashMap<u64, Timer>>,
    /// Timers taken out to run, flagged when cancelled meanwhile.
    in_flight: Mutex<HashMap<u64, bool>>,
    next_id: AtomicU64,
    now: AtomicU64,
}

impl Scheduler {
    fn tick(&self) {
        let now = self.now.fetch_add(1, Ordering::AcqRel) + 1;
        let due: Vec<u64> = self
            .timers
            .lock()
            .iter()
            .filter(|(_, t)| t.next_due <= now)
            .map(|(id, _)| *id)
            .collect();

        for id in due {
            let timer = {
                let mut timers = self.timers.lock();
                let timer = timers.remove(&id);
                if timer.is_some() {
                    self.in_flight.lock().insert(id, false);
                }
                timer
            };
            let Some(mut timer) = timer else { continue };
            run_guarded(|| (timer.task)());
            timer.next_due = now + timer.period.max(1);

            let mut timers = self.timers.lock();
            let cancelled = self.in_flight.lock().remove(&id).unwrap_or(false);
            if !cancelled {
                timers.insert(id, timer);
            }
        }
    }

    /// Unknown and finished ids are ignored.
    fn cancel(&self, id: u64) {
        let mut timers = self.timers.lock();
        if timers.remove(&id).is_none() {
            if let Some(cancelled) = self.in_flight.lock().get_mut(&id) {
                *cancelled = true;
            }
        }
    }
}

fn run_guarded(task: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
        error!("Authoritative task panicked");
    }
}

/// Surface that keeps the last rendered value and logs it.
pub struct ConsoleSurface {
    kind: SurfaceKind,
    values: RwLock<HashMap<Identity, String>>,
}

impl ConsoleSurface {
    pub fn new(kind: SurfaceKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            values: RwLock::new(HashMap::new()),
        })
    }

    pub fn shown(&self, identity: Identity) -> Option<String> {
        self.values.read().get(&identity).cloned()
    }
}

impl PresentationSurface for ConsoleSurface {
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn present(&self, identity: Identity, value: &str) -> Result<(), SurfaceError> {
        debug!(surface = self.kind.as_str(), %identity, shown = %strip(value), "Presented");
        self.values.write().insert(identity, value.to_string());
        Ok(())
    }

    fn current(&self, identity: Identity) -> Result<Option<String>, SurfaceError> {
        Ok(self.shown(identity))
    }
}

pub struct ConsoleHost {
    jobs: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
    scheduler: Arc<Scheduler>,
    online: RwLock<Vec<PlayerRef>>,
    known: RwLock<Vec<PlayerRef>>,
    permissions: RwLock<HashMap<Identity, HashSet<String>>>,
    surfaces: Vec<Arc<ConsoleSurface>>,
}

impl ConsoleHost {
    /// Spawn the authoritative thread.
    pub fn start() -> io::Result<Arc<Self>> {
        let (tx, rx) = mpsc::channel::<Job>();
        let scheduler = Arc::new(Scheduler::default());
        let ticking = Arc::clone(&scheduler);

        let worker = thread::Builder::new()
            .name("authoritative".to_string())
            .spawn(move || {
                let mut next_tick = Instant::now() + TICK;
                loop {
                    let wait = next_tick.saturating_duration_since(Instant::now());
                    match rx.recv_timeout(wait) {
                        Ok(Job::Run(task)) => run_guarded(task),
                        Ok(Job::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                    if Instant::now() >= next_tick {
                        next_tick += TICK;
                        ticking.tick();
                    }
                }
                debug!("Authoritative thread exited");
            })?;

        info!("Console host started");
        Ok(Arc::new(Self {
            jobs: Mutex::new(Some(tx)),
            worker_id: worker.thread().id(),
            worker: Mutex::new(Some(worker)),
            scheduler,
            online: RwLock::new(Vec::new()),
            known: RwLock::new(Vec::new()),
            permissions: RwLock::new(HashMap::new()),
            surfaces: vec![
                ConsoleSurface::new(SurfaceKind::DisplayName),
                ConsoleSurface::new(SurfaceKind::PlayerListName),
                ConsoleSurface::new(SurfaceKind::CustomName),
            ],
        }))
    }

    /// Stop the authoritative thread and wait for it. Queued work still runs.
    pub fn shutdown(&self) {
        if let Some(tx) = self.jobs.lock().take() {
            let _ = tx.send(Job::Stop);
        }
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if thread::current().id() != self.worker_id && worker.join().is_err() {
                warn!("Authoritative thread panicked during shutdown");
            }
        }
    }

    /// Mark online. Reuses the known identity for a returning name.
    pub fn connect(&self, player: PlayerRef) {
        self.known.write().retain(|p| p.identity != player.identity);
        self.known.write().push(player.clone());
        let mut online = self.online.write();
        online.retain(|p| p.identity != player.identity);
        online.push(player);
    }

    pub fn disconnect(&self, identity: Identity) {
        self.online.write().retain(|p| p.identity != identity);
    }

    pub fn grant(&self, identity: Identity, node: &str) {
        self.permissions
            .write()
            .entry(identity)
            .or_default()
            .insert(node.to_string());
    }

    pub fn revoke(&self, identity: Identity, node: &str) {
        if let Some(nodes) = self.permissions.write().get_mut(&identity) {
            nodes.remove(node);
        }
    }

    /// Rendered display name, as the console would show it.
    pub fn shown(&self, identity: Identity) -> Option<String> {
        self.surfaces.first().and_then(|s| s.shown(identity))
    }
}

impl HostContext for ConsoleHost {
    fn run_on_authoritative(&self, task: AuthoritativeTask) {
        if self.is_authoritative_thread() {
            task();
            return;
        }
        let sent = match self.jobs.lock().as_ref() {
            Some(tx) => tx.send(Job::Run(task)).is_ok(),
            None => false,
        };
        if !sent {
            warn!("Authoritative thread stopped, task dropped");
        }
    }

    fn is_authoritative_thread(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    fn schedule_repeating(&self, delay: Ticks, period: Ticks, task: RepeatingTask) -> TaskId {
        let id = self.scheduler.next_id.fetch_add(1, Ordering::AcqRel) + 1;
        let now = self.scheduler.now.load(Ordering::Acquire);
        self.scheduler.timers.lock().insert(
            id,
            Timer {
                next_due: now + delay.max(1),
                period,
                task,
            },
        );
        TaskId(id)
    }

    fn cancel_scheduled(&self, id: TaskId) {
        self.scheduler.cancel(id.0);
    }

    fn is_connected(&self, identity: Identity) -> bool {
        self.online.read().iter().any(|p| p.identity == identity)
    }

    fn connection(&self, identity: Identity) -> Option<PlayerRef> {
        self.online
            .read()
            .iter()
            .find(|p| p.identity == identity)
            .cloned()
    }

    fn online_players(&self) -> Vec<PlayerRef> {
        self.online.read().clone()
    }

    fn find_online_by_name(&self, name: &str) -> Option<PlayerRef> {
        self.online
            .read()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn offline_player(&self, name: &str) -> Option<PlayerRef> {
        self.known
            .read()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn offline_player_by_id(&self, identity: Identity) -> Option<PlayerRef> {
        self.known
            .read()
            .iter()
            .find(|p| p.identity == identity)
            .cloned()
    }

    fn has_permission(&self, identity: Identity, node: &str) -> bool {
        self.is_connected(identity)
            && self
                .permissions
                .read()
                .get(&identity)
                .is_some_and(|nodes| nodes.contains(node) || nodes.contains(ALL_PERMISSIONS))
    }

    fn send_message(&self, to: &CommandSource, message: &str) {
        let recipient = match to {
            CommandSource::Console => "console",
            CommandSource::Player(p) => p.name.as_str(),
        };
        println!("[{recipient}] {}", strip(message));
    }

    fn available_surfaces(&self) -> Vec<Arc<dyn PresentationSurface>> {
        self.surfaces
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn PresentationSurface>)
            .collect()
    }
}

impl Drop for ConsoleHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}
