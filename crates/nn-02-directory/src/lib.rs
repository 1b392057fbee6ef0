//! # Nickname Directory
//!
//! Cross-process source of truth for nicknames, backed by a shared
//! key-value store with a publish/subscribe channel.
//!
//! ## Layout
//!
//! ```text
//! NicknameDirectory ──► KeyValueBackend ──► RedisBackend | MemoryBackend
//!        ▲
//! DirectoryHandle ──► SubscriptionLoop ("nick-directory-sub" thread)
//!                          │
//!                          └──► ChangeListener(ChangeNotification)
//! ```
//!
//! Store faults never propagate to callers of the plain operations: reads
//! come back `None`, writes are dropped, and a warning is logged. Each
//! operation, connect included, runs inside one connection-timeout budget.

pub mod adapters;
pub mod config;
pub mod deadline;
pub mod error;
pub mod handle;
pub mod ports;
pub mod service;
pub mod subscription;
pub mod wire;

pub use adapters::{MemoryBackend, RedisBackend};
pub use config::{ConnectionSettings, DirectoryConfig, KeyLayout};
pub use deadline::Deadline;
pub use error::DirectoryError;
pub use handle::DirectoryHandle;
pub use ports::{KeyValueBackend, MessageSink};
pub use service::NicknameDirectory;
pub use subscription::{ChangeListener, SubscriptionLoop};
pub use wire::{decode_update, encode_update};
