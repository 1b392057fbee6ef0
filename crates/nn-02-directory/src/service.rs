//! NicknameDirectory: async facade over a blocking `KeyValueBackend`.
//!
//! Every call runs on a blocking worker thread under one `Deadline` of the
//! configured timeout, shared by every step the backend takes. Public operations never surface store faults: reads
//! degrade to `None`, writes are dropped, and both log a warning. The
//! `try_*` variants expose the fault for callers that need to know.

use crate::config::{DirectoryConfig, KeyLayout};
use crate::deadline::Deadline;
use crate::error::DirectoryError;
use crate::ports::KeyValueBackend;
use crate::wire;
use nick_types::Identity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct NicknameDirectory {
    backend: Arc<dyn KeyValueBackend>,
    keys: KeyLayout,
    timeout: Duration,
    reconnect_backoff: Duration,
}

impl NicknameDirectory {
    pub fn new(backend: Arc<dyn KeyValueBackend>, config: &DirectoryConfig) -> Self {
        Self {
            backend,
            keys: config.keys.clone(),
            timeout: config.connection.timeout(),
            reconnect_backoff: config.reconnect_backoff,
        }
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    pub fn keys(&self) -> &KeyLayout {
        &self.keys
    }

    pub fn reconnect_backoff(&self) -> Duration {
        self.reconnect_backoff
    }

    /// Stored nickname, or `None` when absent, blank or the store is unreachable.
    pub async fn get(&self, identity: Identity) -> Option<String> {
        self.try_get(identity).await.unwrap_or_else(|e| {
            warn!(%identity, error = %e, "Nickname lookup failed");
            None
        })
    }

    /// Write (or clear on `None`/blank) and broadcast the change.
    pub async fn set(&self, identity: Identity, nick: Option<&str>) {
        if let Err(e) = self.try_set(identity, nick).await {
            warn!(%identity, error = %e, "Nickname write dropped");
        }
    }

    /// Nickname saved before the last hide.
    pub async fn get_prior(&self, identity: Identity) -> Option<String> {
        self.try_get_prior(identity).await.unwrap_or_else(|e| {
            warn!(%identity, error = %e, "Prior nickname lookup failed");
            None
        })
    }

    /// Not broadcast.
    pub async fn set_prior(&self, identity: Identity, nick: Option<&str>) {
        if let Err(e) = self.try_set_prior(identity, nick).await {
            warn!(%identity, error = %e, "Prior nickname write dropped");
        }
    }

    pub async fn clear_prior(&self, identity: Identity) {
        self.set_prior(identity, None).await;
    }

    pub async fn try_get(&self, identity: Identity) -> Result<Option<String>, DirectoryError> {
        let key = self.keys.nick_key(identity);
        self.read("get", key).await
    }

    pub async fn try_get_prior(
        &self,
        identity: Identity,
    ) -> Result<Option<String>, DirectoryError> {
        let key = self.keys.prior_key(identity);
        self.read("get_prior", key).await
    }

    pub async fn try_set(
        &self,
        identity: Identity,
        nick: Option<&str>,
    ) -> Result<(), DirectoryError> {
        let value = non_blank(nick);
        let key = self.keys.nick_key(identity);
        let channel = self.keys.channel.clone();
        let payload = wire::encode_update(identity, value.as_deref());

        debug!(%identity, clear = value.is_none(), "Writing nickname");
        self.run("set", move |backend, deadline| {
            backend.put_and_publish(&key, value.as_deref(), &channel, &payload, deadline)
        })
        .await
    }

    pub async fn try_set_prior(
        &self,
        identity: Identity,
        nick: Option<&str>,
    ) -> Result<(), DirectoryError> {
        let value = non_blank(nick);
        let key = self.keys.prior_key(identity);
        self.run("set_prior", move |backend, deadline| {
            backend.put(&key, value.as_deref(), deadline)
        })
        .await
    }

    async fn read(&self, op: &'static str, key: String) -> Result<Option<String>, DirectoryError> {
        let value = self
            .run(op, move |backend, deadline| backend.get(&key, deadline))
            .await?;
        Ok(non_blank(value.as_deref()))
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T, DirectoryError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn KeyValueBackend, &Deadline) -> Result<T, DirectoryError> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let deadline = Arc::new(Deadline::after(self.timeout));
        let mut task = tokio::task::spawn_blocking({
            let deadline = Arc::clone(&deadline);
            move || f(backend.as_ref(), &deadline)
        });

        let at = tokio::time::Instant::from_std(deadline.at());
        let joined = match tokio::time::timeout_at(at, &mut task).await {
            Ok(joined) => joined,
            Err(_) if deadline.abandon() => return Err(deadline.expired(op)),
            Err(_) => {
                // Committed before the deadline; the write may still land.
                debug!(op, "Waiting on committed write past its deadline");
                task.await
            }
        };
        joined.map_err(|join| DirectoryError::unavailable(op, join))?
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryBackend;

    fn directory() -> (MemoryBackend, NicknameDirectory) {
        let backend = MemoryBackend::new();
        let dir = NicknameDirectory::new(Arc::new(backend.clone()), &DirectoryConfig::default());
        (backend, dir)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (_, dir) = directory();
        let id = Identity::random();
        dir.set(id, Some("&aBob")).await;
        assert_eq!(dir.get(id).await.as_deref(), Some("&aBob"));
    }

    #[tokio::test]
    async fn test_set_publishes_payload() {
        let (backend, dir) = directory();
        let id = Identity::random();
        dir.set(id, Some("Bob")).await;
        assert_eq!(backend.published_count(), 1);
        assert_eq!(
            backend.peek(&format!("networknick:nick:{id}")).as_deref(),
            Some("Bob")
        );
    }

    #[tokio::test]
    async fn test_blank_set_clears() {
        let (backend, dir) = directory();
        let id = Identity::random();
        dir.set(id, Some("Bob")).await;
        dir.set(id, Some("   ")).await;
        assert_eq!(dir.get(id).await, None);
        assert_eq!(backend.peek(&format!("networknick:nick:{id}")), None);
        assert_eq!(backend.published_count(), 2);
    }

    #[tokio::test]
    async fn test_prior_is_separate_and_silent() {
        let (backend, dir) = directory();
        let id = Identity::random();
        dir.set_prior(id, Some("&aBob")).await;
        assert_eq!(dir.get_prior(id).await.as_deref(), Some("&aBob"));
        assert_eq!(dir.get(id).await, None);
        assert_eq!(backend.published_count(), 0);

        dir.clear_prior(id).await;
        assert_eq!(dir.get_prior(id).await, None);
    }

    #[tokio::test]
    async fn test_outage_degrades() {
        let (backend, dir) = directory();
        let id = Identity::random();
        dir.set(id, Some("Bob")).await;

        backend.set_available(false);
        assert_eq!(dir.get(id).await, None);
        assert!(dir.try_get(id).await.is_err());
        dir.set(id, Some("Alice")).await;

        backend.set_available(true);
        assert_eq!(dir.get(id).await.as_deref(), Some("Bob"));
    }

    fn slow_directory(timeout_ms: u64, latency: Duration) -> (MemoryBackend, NicknameDirectory) {
        let backend = MemoryBackend::new();
        backend.set_latency(latency);
        let mut config = DirectoryConfig::default();
        config.connection.timeout_ms = timeout_ms;
        let dir = NicknameDirectory::new(Arc::new(backend.clone()), &config);
        (backend, dir)
    }

    #[test]
    fn test_default_budget_is_four_seconds() {
        let (_, dir) = directory();
        assert_eq!(dir.timeout, Duration::from_millis(4000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_store_bounded_by_one_budget() {
        let (_, dir) = slow_directory(200, Duration::from_millis(600));
        let id = Identity::random();

        let started = std::time::Instant::now();
        assert_eq!(
            dir.try_get(id).await,
            Err(DirectoryError::Timeout {
                op: "get",
                timeout_ms: 200
            })
        );
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_write_never_lands() {
        let (backend, dir) = slow_directory(200, Duration::from_millis(400));
        let id = Identity::random();

        assert!(matches!(
            dir.try_set(id, Some("Late")).await,
            Err(DirectoryError::Timeout { op: "set", .. })
        ));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(backend.peek(&format!("networknick:nick:{id}")), None);
        assert_eq!(backend.published_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_write_within_budget_lands() {
        let (backend, dir) = slow_directory(500, Duration::from_millis(100));
        let id = Identity::random();
        assert_eq!(dir.try_set(id, Some("Bob")).await, Ok(()));
        assert_eq!(
            backend.peek(&format!("networknick:nick:{id}")).as_deref(),
            Some("Bob")
        );
    }

    #[tokio::test]
    async fn test_unreachable_redis_reads_none() {
        use crate::adapters::RedisBackend;
        use crate::config::ConnectionSettings;

        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = DirectoryConfig {
            connection: ConnectionSettings {
                port,
                timeout_ms: 300,
                ..Default::default()
            },
            ..Default::default()
        };
        let backend = RedisBackend::new(&config.connection).unwrap();
        let dir = NicknameDirectory::new(Arc::new(backend), &config);

        let id = Identity::random();
        let read = tokio::time::timeout(Duration::from_secs(3), dir.get(id)).await;
        assert_eq!(read.unwrap(), None);
    }
}
