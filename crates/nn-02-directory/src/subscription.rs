//! Long-lived subscription to the change channel.
//!
//! Runs on its own named thread. On any fault it logs, waits the reconnect
//! backoff and subscribes again, until stopped.

use crate::ports::KeyValueBackend;
use crate::wire;
use nick_types::ChangeNotification;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Called on the subscription thread for every decoded notification.
pub type ChangeListener = Arc<dyn Fn(ChangeNotification) + Send + Sync>;

const THREAD_NAME: &str = "nick-directory-sub";

/// Slice used when sleeping through the backoff so stop stays responsive.
const STOP_CHECK: Duration = Duration::from_millis(50);

pub struct SubscriptionLoop {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SubscriptionLoop {
    pub fn spawn(
        backend: Arc<dyn KeyValueBackend>,
        channel: String,
        backoff: Duration,
        listener: ChangeListener,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(backend, &channel, backoff, &flag, listener))?;

        Ok(Self {
            running,
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Signal stop and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Directory subscription thread panicked");
            }
        }
    }
}

impl Drop for SubscriptionLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    backend: Arc<dyn KeyValueBackend>,
    channel: &str,
    backoff: Duration,
    running: &AtomicBool,
    listener: ChangeListener,
) {
    info!(channel, backend = backend.name(), "Directory subscription started");

    let mut sink = |from: &str, payload: &str| {
        if from != channel {
            return;
        }
        match wire::decode_update(payload) {
            Some(notification) => listener(notification),
            None => debug!(payload, "Ignoring malformed directory update"),
        }
    };

    while running.load(Ordering::Acquire) {
        match backend.subscribe(channel, running, &mut sink) {
            Ok(()) if !running.load(Ordering::Acquire) => break,
            Ok(()) => warn!(channel, "Directory subscription ended unexpectedly"),
            Err(e) => warn!(channel, error = %e, "Directory subscription failed"),
        }
        sleep_while_running(backoff, running);
    }

    info!(channel, "Directory subscription stopped");
}

fn sleep_while_running(total: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + total;
    while running.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(STOP_CHECK.min(deadline - now));
    }
}
