//! `/networknick reload`.

use crate::context::{CommandContext, Dispatch};
use crate::messages::MessageKey;
use async_trait::async_trait;
use nick_types::CommandSource;
use nn_02_directory::DirectoryError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Reload task failed: {0}")]
    Task(String),
}

/// Re-reads configuration, rebuilds the directory connection and re-applies
/// everyone online.
#[async_trait]
pub trait Reloadable: Send + Sync {
    async fn reload(&self) -> Result<(), ReloadError>;
}

pub struct ReloadCommand {
    ctx: Arc<CommandContext>,
    target: Arc<dyn Reloadable>,
}

impl ReloadCommand {
    pub fn new(ctx: Arc<CommandContext>, target: Arc<dyn Reloadable>) -> Self {
        Self { ctx, target }
    }

    pub fn execute(&self, source: &CommandSource) -> Dispatch {
        if !self.ctx.allowed(source, &self.ctx.settings().nodes.reload) {
            self.ctx.reply(source, MessageKey::NoPermission, &[]);
            return Dispatch::Done;
        }

        let ctx = Arc::clone(&self.ctx);
        let target = Arc::clone(&self.target);
        let source = source.clone();
        self.ctx.spawn(async move {
            match target.reload().await {
                Ok(()) => {
                    info!("Configuration reloaded");
                    ctx.reply(&source, MessageKey::Reloaded, &[]);
                }
                Err(e) => {
                    error!(error = %e, "Reload failed");
                    ctx.reply(&source, MessageKey::ReloadFailed, &[]);
                }
            }
        })
    }
}
