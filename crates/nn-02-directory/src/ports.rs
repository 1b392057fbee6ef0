//! Outbound port to the shared key-value + publish/subscribe store.
//!
//! Calls are blocking; `NicknameDirectory` drives them from worker threads.
//! Implementations acquire a connection per call and release it on every exit
//! path, so a single backend may be used from many threads at once.
//!
//! Each call takes the `Deadline` of the directory operation it serves: every
//! blocking step is bounded by `Deadline::remaining`, and writes must pass
//! `Deadline::commit` before they leave for the store.

use crate::deadline::Deadline;
use crate::error::DirectoryError;
use std::sync::atomic::AtomicBool;

/// Receives `(channel, payload)` for every message on a subscribed channel.
pub type MessageSink<'a> = dyn FnMut(&str, &str) + 'a;

/// Blocking key-value + broadcast store.
pub trait KeyValueBackend: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn get(&self, key: &str, deadline: &Deadline) -> Result<Option<String>, DirectoryError>;

    /// Write `value`, or delete the key when `None`.
    fn put(&self, key: &str, value: Option<&str>, deadline: &Deadline) -> Result<(), DirectoryError>;

    fn publish(&self, channel: &str, payload: &str, deadline: &Deadline) -> Result<(), DirectoryError>;

    /// Write and publish as one unit under a single commit.
    fn put_and_publish(
        &self,
        key: &str,
        value: Option<&str>,
        channel: &str,
        payload: &str,
        deadline: &Deadline,
    ) -> Result<(), DirectoryError>;

    /// Block delivering messages to `sink` until `running` turns false
    /// (returns `Ok`) or the connection faults (returns `Err`).
    ///
    /// `running` must be observed at least every few hundred milliseconds.
    fn subscribe(
        &self,
        channel: &str,
        running: &AtomicBool,
        sink: &mut MessageSink<'_>,
    ) -> Result<(), DirectoryError>;
}
