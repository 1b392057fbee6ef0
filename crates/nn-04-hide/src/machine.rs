//! HideStateMachine: toggles an identity between its nickname and a hidden one.
//!
//! ```text
//! Visible(nick | absent) ──hide──► Hidden(value, prior = nick | cleared)
//! Hidden(value, prior)   ──unhide──► Visible(prior | absent), prior cleared
//! ```
//!
//! State is read from the directory on every call, so the machine itself is
//! stateless and every process agrees on where an identity stands.

use crate::config::HideConfig;
use crate::error::HideError;
use nick_types::Identity;
use nn_01_text_codec::is_hide_nick;
use nn_02_directory::DirectoryHandle;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Where an identity stands, as read from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HideState {
    Visible(Option<String>),
    Hidden { value: String, prior: Option<String> },
}

impl HideState {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden { .. })
    }
}

/// Result of a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HideOutcome {
    /// Now hidden behind `value`.
    Hidden { value: String },
    /// Visible again; `restored` is `None` when back to the real name.
    Unhidden { restored: Option<String> },
}

struct Settings {
    hide: HideConfig,
    max_visible_len: usize,
}

pub struct HideStateMachine {
    directory: Arc<DirectoryHandle>,
    settings: RwLock<Settings>,
}

impl HideStateMachine {
    pub fn new(directory: Arc<DirectoryHandle>, hide: HideConfig, max_visible_len: usize) -> Self {
        Self {
            directory,
            settings: RwLock::new(Settings {
                hide,
                max_visible_len,
            }),
        }
    }

    /// Swap in reloaded settings.
    pub fn reconfigure(&self, hide: HideConfig, max_visible_len: usize) {
        *self.settings.write() = Settings {
            hide,
            max_visible_len,
        };
    }

    /// The value a hide would write right now.
    pub fn hidden_value(&self) -> String {
        let settings = self.settings.read();
        settings.hide.hidden_value(settings.max_visible_len)
    }

    pub async fn state(&self, identity: Identity) -> HideState {
        let directory = self.directory.current();
        match directory.get(identity).await {
            Some(value) if is_hide_nick(&value) => HideState::Hidden {
                value,
                prior: directory.get_prior(identity).await,
            },
            current => HideState::Visible(current),
        }
    }

    pub async fn toggle(&self, identity: Identity) -> HideOutcome {
        match self.state(identity).await {
            HideState::Hidden { prior, .. } => self.restore(identity, prior).await,
            HideState::Visible(current) => self.hide_from(identity, current).await,
        }
    }

    /// Hide unless already hidden, in which case the current value is kept.
    pub async fn hide(&self, identity: Identity) -> HideOutcome {
        match self.state(identity).await {
            HideState::Hidden { value, .. } => HideOutcome::Hidden { value },
            HideState::Visible(current) => self.hide_from(identity, current).await,
        }
    }

    pub async fn unhide(&self, identity: Identity) -> Result<HideOutcome, HideError> {
        match self.state(identity).await {
            HideState::Hidden { prior, .. } => Ok(self.restore(identity, prior).await),
            HideState::Visible(_) => Err(HideError::NotHidden),
        }
    }

    async fn hide_from(&self, identity: Identity, current: Option<String>) -> HideOutcome {
        let directory = self.directory.current();
        match current.filter(|c| !c.trim().is_empty() && !is_hide_nick(c)) {
            Some(nick) => directory.set_prior(identity, Some(&nick)).await,
            None => directory.clear_prior(identity).await,
        }

        let value = self.hidden_value();
        debug!(%identity, "Hiding nickname");
        directory.set(identity, Some(&value)).await;
        HideOutcome::Hidden { value }
    }

    async fn restore(&self, identity: Identity, prior: Option<String>) -> HideOutcome {
        let directory = self.directory.current();
        let restored = prior.filter(|p| !p.trim().is_empty());

        debug!(%identity, restored = restored.is_some(), "Unhiding nickname");
        directory.set(identity, restored.as_deref()).await;
        directory.clear_prior(identity).await;
        HideOutcome::Unhidden { restored }
    }
}
