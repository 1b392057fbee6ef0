//! Owned handle over the active directory and its subscription.
//!
//! Reload swaps in a new directory through `replace`, which stops and joins
//! the old subscription before the new one starts. At most one subscription
//! runs per handle.

use crate::error::DirectoryError;
use crate::service::NicknameDirectory;
use crate::subscription::{ChangeListener, SubscriptionLoop};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::info;

pub struct DirectoryHandle {
    directory: RwLock<Arc<NicknameDirectory>>,
    subscription: Mutex<Option<SubscriptionLoop>>,
    listener: Mutex<Option<ChangeListener>>,
}

impl DirectoryHandle {
    pub fn new(directory: NicknameDirectory) -> Self {
        Self {
            directory: RwLock::new(Arc::new(directory)),
            subscription: Mutex::new(None),
            listener: Mutex::new(None),
        }
    }

    /// The directory in effect right now.
    pub fn current(&self) -> Arc<NicknameDirectory> {
        self.directory.read().clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .as_ref()
            .is_some_and(SubscriptionLoop::is_running)
    }

    /// Start the subscription, delivering notifications to `listener`.
    /// No-op when one is already running.
    pub fn start(&self, listener: ChangeListener) -> Result<(), DirectoryError> {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return Ok(());
        }
        *self.listener.lock() = Some(listener.clone());
        *subscription = Some(self.spawn_loop(listener)?);
        Ok(())
    }

    /// Stop and join the subscription. Blocks for at most one poll interval.
    pub fn stop(&self) {
        let running = self.subscription.lock().take();
        if let Some(running) = running {
            running.stop();
        }
    }

    /// Swap in `directory`. The old subscription is fully stopped before
    /// the new one starts with the same listener.
    pub fn replace(&self, directory: NicknameDirectory) -> Result<(), DirectoryError> {
        let mut subscription = self.subscription.lock();
        let was_running = subscription.take();
        let restart = was_running.is_some();
        if let Some(old) = was_running {
            old.stop();
        }

        *self.directory.write() = Arc::new(directory);
        info!(
            backend = self.current().backend().name(),
            "Directory replaced"
        );

        if restart {
            if let Some(listener) = self.listener.lock().clone() {
                *subscription = Some(self.spawn_loop(listener)?);
            }
        }
        Ok(())
    }

    fn spawn_loop(&self, listener: ChangeListener) -> Result<SubscriptionLoop, DirectoryError> {
        let directory = self.current();
        SubscriptionLoop::spawn(
            Arc::clone(directory.backend()),
            directory.keys().channel.clone(),
            directory.reconnect_backoff(),
            listener,
        )
        .map_err(|e| DirectoryError::unavailable("subscribe", e))
    }
}

impl Drop for DirectoryHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
