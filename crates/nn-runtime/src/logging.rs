//! Tracing subscriber setup.
//!
//! Level: `NN_LOG_LEVEL`, else `RUST_LOG`, else `info`. `NN_JSON_LOGS=true`
//! switches to JSON lines.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LEVEL: &str = "info";

/// The filter directive to use given the two environment inputs.
pub fn filter_directive(nn_log_level: Option<String>, rust_log: Option<String>) -> String {
    nn_log_level
        .into_iter()
        .chain(rust_log)
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

pub fn json_enabled(value: Option<String>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init() -> anyhow::Result<()> {
    let directive = filter_directive(
        std::env::var("NN_LOG_LEVEL").ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true);

    let installed = if json_enabled(std::env::var("NN_JSON_LOGS").ok()) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
