//! Redis-backed store.
//!
//! Each call opens its own connection and drops it before returning. The
//! connect and every command take their timeouts from the call's `Deadline`,
//! so connect plus commands share one budget. A nickname write sends SET (or
//! DEL) and PUBLISH as one MULTI/EXEC transaction in a single round trip, so
//! it is either applied and announced together or not at all. The subscription holds one dedicated connection
//! for as long as it runs and polls it with a short read timeout so a stop
//! request is observed promptly.

use crate::config::ConnectionSettings;
use crate::deadline::Deadline;
use crate::error::DirectoryError;
use crate::ports::{KeyValueBackend, MessageSink};
use redis::IntoConnectionInfo;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

/// Upper bound on how long a subscription read blocks before re-checking its stop flag.
const SUBSCRIBE_POLL: Duration = Duration::from_millis(250);

pub struct RedisBackend {
    client: redis::Client,
    timeout: Duration,
}

impl RedisBackend {
    /// Build a client. No connection is attempted until the first call.
    pub fn new(settings: &ConnectionSettings) -> Result<Self, DirectoryError> {
        let scheme = if settings.ssl { "rediss" } else { "redis" };
        let mut info = format!("{scheme}://{}:{}/", settings.host, settings.port)
            .into_connection_info()
            .map_err(|e| DirectoryError::InvalidConfig(e.to_string()))?;

        if !settings.username.is_empty() {
            info.redis.username = Some(settings.username.clone());
        }
        if !settings.password.is_empty() {
            info.redis.password = Some(settings.password.clone());
        }

        let client =
            redis::Client::open(info).map_err(|e| DirectoryError::InvalidConfig(e.to_string()))?;

        debug!(
            host = %settings.host,
            port = settings.port,
            ssl = settings.ssl,
            "Redis client configured"
        );

        Ok(Self {
            client,
            timeout: settings.timeout(),
        })
    }

    /// Connection for one call, connect bounded by what is left of `deadline`.
    fn connection(
        &self,
        op: &'static str,
        deadline: &Deadline,
    ) -> Result<redis::Connection, DirectoryError> {
        let con = self
            .client
            .get_connection_with_timeout(deadline.remaining(op)?)
            .map_err(|e| self.fault(op, e))?;
        self.arm(&con, op, deadline)?;
        Ok(con)
    }

    /// Bound the next round trip on `con` by what is left of `deadline`.
    fn arm(
        &self,
        con: &redis::Connection,
        op: &'static str,
        deadline: &Deadline,
    ) -> Result<(), DirectoryError> {
        let left = deadline.remaining(op)?;
        con.set_read_timeout(Some(left))
            .map_err(|e| self.fault(op, e))?;
        con.set_write_timeout(Some(left))
            .map_err(|e| self.fault(op, e))
    }

    fn fault(&self, op: &'static str, err: redis::RedisError) -> DirectoryError {
        if err.is_timeout() {
            DirectoryError::Timeout {
                op,
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            DirectoryError::unavailable(op, err)
        }
    }

    /// Send `cmd` as a write: arm the socket, commit, then one round trip.
    fn write<T: redis::FromRedisValue>(
        &self,
        con: &mut redis::Connection,
        op: &'static str,
        deadline: &Deadline,
        cmd: &redis::Cmd,
    ) -> Result<T, DirectoryError> {
        self.arm(con, op, deadline)?;
        deadline.commit(op)?;
        cmd.query(con).map_err(|e| self.fault(op, e))
    }
}

impl KeyValueBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn get(&self, key: &str, deadline: &Deadline) -> Result<Option<String>, DirectoryError> {
        let mut con = self.connection("get", deadline)?;
        redis::cmd("GET")
            .arg(key)
            .query(&mut con)
            .map_err(|e| self.fault("get", e))
    }

    fn put(
        &self,
        key: &str,
        value: Option<&str>,
        deadline: &Deadline,
    ) -> Result<(), DirectoryError> {
        let mut con = self.connection("set", deadline)?;
        self.write(&mut con, "set", deadline, &store_cmd(key, value))
    }

    fn publish(&self, channel: &str, payload: &str, deadline: &Deadline) -> Result<(), DirectoryError> {
        let mut con = self.connection("publish", deadline)?;
        let mut cmd = redis::cmd("PUBLISH");
        cmd.arg(channel).arg(payload);
        let receivers: i64 = self.write(&mut con, "publish", deadline, &cmd)?;
        trace!(channel, receivers, "Published directory update");
        Ok(())
    }

    fn put_and_publish(
        &self,
        key: &str,
        value: Option<&str>,
        channel: &str,
        payload: &str,
        deadline: &Deadline,
    ) -> Result<(), DirectoryError> {
        let mut con = self.connection("set", deadline)?;
        let mut pipe = redis::pipe();
        pipe.atomic()
            .add_command(store_cmd(key, value))
            .ignore()
            .cmd("PUBLISH")
            .arg(channel)
            .arg(payload)
            .ignore();

        self.arm(&con, "set", deadline)?;
        deadline.commit("set")?;
        pipe.query::<()>(&mut con)
            .map_err(|e| self.fault("set", e))?;
        trace!(channel, "Stored and published directory update");
        Ok(())
    }

    fn subscribe(
        &self,
        channel: &str,
        running: &AtomicBool,
        sink: &mut MessageSink<'_>,
    ) -> Result<(), DirectoryError> {
        let mut con = self.connection("subscribe", &Deadline::after(self.timeout))?;
        let mut pubsub = con.as_pubsub();
        pubsub
            .set_read_timeout(Some(SUBSCRIBE_POLL.min(self.timeout)))
            .map_err(|e| self.fault("subscribe", e))?;
        pubsub
            .subscribe(channel)
            .map_err(|e| self.fault("subscribe", e))?;

        debug!(channel, "Subscribed to directory channel");

        while running.load(Ordering::Acquire) {
            let msg = match pubsub.get_message() {
                Ok(msg) => msg,
                Err(e) if e.is_timeout() => continue,
                Err(e) => return Err(DirectoryError::unavailable("subscribe", e)),
            };
            match msg.get_payload::<String>() {
                Ok(payload) => sink(msg.get_channel_name(), &payload),
                Err(e) => debug!(error = %e, "Skipping non-text directory message"),
            }
        }

        // Best effort; the connection is dropped right after either way.
        let _ = pubsub.unsubscribe(channel);
        Ok(())
    }
}

/// SET, or DEL when the value is absent.
fn store_cmd(key: &str, value: Option<&str>) -> redis::Cmd {
    match value {
        Some(value) => {
            let mut cmd = redis::cmd("SET");
            cmd.arg(key).arg(value);
            cmd
        }
        None => {
            let mut cmd = redis::cmd("DEL");
            cmd.arg(key);
            cmd
        }
    }
}
