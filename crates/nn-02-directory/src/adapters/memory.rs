//! In-process store.
//!
//! Several `MemoryBackend` clones share one store, which stands in for a
//! Redis instance shared by several processes. Availability can be toggled
//! to simulate an outage: calls fail and running subscriptions error out.
//! A per-call latency simulates a slow store; it is slept before the call
//! checks its deadline, the way a slow network round trip would.

use crate::deadline::Deadline;
use crate::error::DirectoryError;
use crate::ports::{KeyValueBackend, MessageSink};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const SUBSCRIBE_POLL: Duration = Duration::from_millis(20);

type Envelope = (String, String);

#[derive(Default)]
struct Store {
    data: Mutex<HashMap<String, String>>,
    subscribers: Mutex<Vec<(String, Sender<Envelope>)>>,
    unavailable: AtomicBool,
    published: AtomicU64,
    latency_ms: AtomicU64,
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    store: Arc<Store>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.store.unavailable.store(!available, Ordering::Release);
    }

    /// Delay every key-value call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.store
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::Release);
    }

    /// Raw value under `key`, bypassing availability.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.store.data.lock().get(key).cloned()
    }

    /// Messages published so far.
    pub fn published_count(&self) -> u64 {
        self.store.published.load(Ordering::Acquire)
    }

    /// Live subscriptions on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.store
            .subscribers
            .lock()
            .iter()
            .filter(|(c, _)| c == channel)
            .count()
    }

    /// Broadcast on `channel` directly, bypassing availability and deadlines.
    pub fn announce(&self, channel: &str, payload: &str) {
        self.broadcast(channel, payload);
    }

    /// Store `value` directly, bypassing availability and deadlines.
    pub fn seed(&self, key: &str, value: Option<&str>) {
        write(&mut self.store.data.lock(), key, value);
    }

    fn broadcast(&self, channel: &str, payload: &str) {
        self.store.published.fetch_add(1, Ordering::AcqRel);
        self.store.subscribers.lock().retain(|(c, tx)| {
            if c != channel {
                return true;
            }
            tx.send((channel.to_string(), payload.to_string())).is_ok()
        });
    }

    fn ensure_available(&self, op: &'static str) -> Result<(), DirectoryError> {
        if self.store.unavailable.load(Ordering::Acquire) {
            return Err(DirectoryError::unavailable(op, "connection refused"));
        }
        Ok(())
    }

    /// Simulated round trip, then a read-side deadline check.
    fn round_trip(&self, op: &'static str, deadline: &Deadline) -> Result<(), DirectoryError> {
        self.ensure_available(op)?;
        let latency = self.store.latency_ms.load(Ordering::Acquire);
        if latency > 0 {
            thread::sleep(Duration::from_millis(latency));
        }
        deadline.remaining(op)?;
        self.ensure_available(op)
    }
}

fn write(data: &mut HashMap<String, String>, key: &str, value: Option<&str>) {
    match value {
        Some(v) => {
            data.insert(key.to_string(), v.to_string());
        }
        None => {
            data.remove(key);
        }
    }
}

impl KeyValueBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str, deadline: &Deadline) -> Result<Option<String>, DirectoryError> {
        self.round_trip("get", deadline)?;
        Ok(self.store.data.lock().get(key).cloned())
    }

    fn put(
        &self,
        key: &str,
        value: Option<&str>,
        deadline: &Deadline,
    ) -> Result<(), DirectoryError> {
        self.round_trip("set", deadline)?;
        deadline.commit("set")?;
        write(&mut self.store.data.lock(), key, value);
        Ok(())
    }

    fn publish(&self, channel: &str, payload: &str, deadline: &Deadline) -> Result<(), DirectoryError> {
        self.round_trip("publish", deadline)?;
        deadline.commit("publish")?;
        self.broadcast(channel, payload);
        Ok(())
    }

    /// Writes and broadcasts under the data lock, so subscribers receive
    /// concurrent writes in the order they were stored.
    fn put_and_publish(
        &self,
        key: &str,
        value: Option<&str>,
        channel: &str,
        payload: &str,
        deadline: &Deadline,
    ) -> Result<(), DirectoryError> {
        self.round_trip("set", deadline)?;
        let mut data = self.store.data.lock();
        deadline.commit("set")?;
        write(&mut data, key, value);
        self.broadcast(channel, payload);
        Ok(())
    }

    fn subscribe(
        &self,
        channel: &str,
        running: &AtomicBool,
        sink: &mut MessageSink<'_>,
    ) -> Result<(), DirectoryError> {
        self.ensure_available("subscribe")?;
        let (tx, rx) = mpsc::channel();
        self.store
            .subscribers
            .lock()
            .push((channel.to_string(), tx));

        while running.load(Ordering::Acquire) {
            if self.store.unavailable.load(Ordering::Acquire) {
                return Err(DirectoryError::unavailable("subscribe", "connection reset"));
            }
            match rx.recv_timeout(SUBSCRIBE_POLL) {
                Ok((c, payload)) => sink(&c, &payload),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DirectoryError::unavailable("subscribe", "subscription dropped"))
                }
            }
        }
        // Receiver drops here; the sender is pruned on the next publish.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> Deadline {
        Deadline::after(Duration::from_secs(1))
    }

    #[test]
    fn test_put_get_delete() {
        let backend = MemoryBackend::new();
        backend.put("k", Some("v"), &budget()).unwrap();
        assert_eq!(backend.get("k", &budget()).unwrap().as_deref(), Some("v"));
        backend.put("k", None, &budget()).unwrap();
        assert_eq!(backend.get("k", &budget()).unwrap(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let a = MemoryBackend::new();
        let b = a.clone();
        a.put("k", Some("v"), &budget()).unwrap();
        assert_eq!(b.get("k", &budget()).unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_unavailable_fails_calls() {
        let backend = MemoryBackend::new();
        backend.set_available(false);
        assert!(backend.get("k", &budget()).is_err());
        assert!(backend.put("k", Some("v"), &budget()).is_err());
        backend.set_available(true);
        assert!(backend.get("k", &budget()).is_ok());
    }

    #[test]
    fn test_slow_write_past_deadline_is_not_applied() {
        let backend = MemoryBackend::new();
        backend.set_latency(Duration::from_millis(50));
        let deadline = Deadline::after(Duration::from_millis(20));
        assert!(matches!(
            backend.put_and_publish("k", Some("v"), "chan", "payload", &deadline),
            Err(DirectoryError::Timeout { .. })
        ));
        assert_eq!(backend.peek("k"), None);
        assert_eq!(backend.published_count(), 0);
    }

    #[test]
    fn test_abandoned_write_is_not_applied() {
        let backend = MemoryBackend::new();
        let deadline = budget();
        assert!(deadline.abandon());
        assert!(backend.put("k", Some("v"), &deadline).is_err());
        assert_eq!(backend.peek("k"), None);
    }

    #[test]
    fn test_subscribe_receives_and_stops() {
        let backend = MemoryBackend::new();
        let running = Arc::new(AtomicBool::new(true));
        let (seen_tx, seen_rx) = mpsc::channel::<String>();

        let sub = {
            let backend = backend.clone();
            let running = running.clone();
            thread::spawn(move || {
                let mut sink = |_: &str, payload: &str| {
                    let _ = seen_tx.send(payload.to_string());
                };
                backend.subscribe("chan", &running, &mut sink)
            })
        };

        while backend.subscriber_count("chan") == 0 {
            thread::sleep(Duration::from_millis(5));
        }
        backend.publish("other", "ignored", &budget()).unwrap();
        backend.publish("chan", "hello", &budget()).unwrap();
        assert_eq!(
            seen_rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            "hello"
        );

        running.store(false, Ordering::Release);
        assert!(sub.join().unwrap().is_ok());
    }

    #[test]
    fn test_outage_breaks_subscription() {
        let backend = MemoryBackend::new();
        let running = AtomicBool::new(true);
        let outage = backend.clone();
        let toggler = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            outage.set_available(false);
        });
        let mut sink = |_: &str, _: &str| {};
        assert!(backend.subscribe("chan", &running, &mut sink).is_err());
        toggler.join().unwrap();
    }
}
