//! # NetworkNick Runtime
//!
//! Wires the nickname subsystems into one process and provides a development
//! host for running it without a game server. The `networknick` binary is
//! the entry point; the modules are exposed for the workspace tests.

#![allow(clippy::type_complexity)]

pub mod config;
pub mod console;
pub mod container;
pub mod logging;
pub mod repl;

pub use config::{config_path, ConfigError, NickConfig};
pub use console::{ConsoleHost, ConsoleSurface};
pub use container::{redis_backends, BackendFactory, ConfigLoader, ContainerError, NickContainer};
pub use repl::{parse, ConsoleCommand, ConsoleSession, ParseError};
