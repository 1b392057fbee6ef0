//! Values read during the host's pre-connect phase, consumed on connect.

use nick_types::Identity;
use nn_02_directory::NicknameDirectory;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct PreConnectCache {
    values: Mutex<HashMap<Identity, String>>,
}

impl PreConnectCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the directory for a connecting identity and stash the result.
    ///
    /// Runs in the host's async pre-connect hook, never on the authoritative thread.
    pub async fn prefetch(&self, directory: &NicknameDirectory, identity: Identity) {
        let value = directory.get(identity).await;
        self.put(identity, value);
    }

    /// Stash `value`; absent or blank removes any earlier entry.
    pub fn put(&self, identity: Identity, value: Option<String>) {
        let mut values = self.values.lock();
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => {
                values.insert(identity, v);
            }
            None => {
                values.remove(&identity);
            }
        }
    }

    pub fn pop(&self, identity: Identity) -> Option<String> {
        self.values.lock().remove(&identity)
    }

    pub fn clear(&self, identity: Identity) {
        self.values.lock().remove(&identity);
    }
}
