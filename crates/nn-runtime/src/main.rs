//! `networknick`: one process of the nickname network, players simulated on stdin.

use anyhow::{Context, Result};
use nn_runtime::{
    config_path, logging, redis_backends, ConfigLoader, ConsoleHost, ConsoleSession,
    NickConfig, NickContainer,
};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let path = config_path();
    let loader: ConfigLoader = Arc::new(move || NickConfig::load(&path));

    let host = ConsoleHost::start().context("failed to start the authoritative thread")?;
    let container = NickContainer::build(
        host.clone(),
        loader,
        redis_backends(),
        None,
        Handle::current(),
    )
    .context("failed to build the nickname runtime")?;
    container
        .start()
        .context("failed to subscribe to nickname changes")?;

    let session = ConsoleSession::new(Arc::clone(&host), Arc::clone(&container));
    info!("NetworkNick is running. Type 'help' for commands, Ctrl+C to stop.");

    let outcome = tokio::select! {
        result = session.run_stdin() => result.context("console input failed"),
        result = tokio::signal::ctrl_c() => result.context("failed to listen for Ctrl+C"),
    };

    container.shutdown();
    host.shutdown();
    outcome
}
