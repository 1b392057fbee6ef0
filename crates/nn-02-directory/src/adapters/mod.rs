//! Store adapters.

pub mod memory;
pub mod redis;

pub use memory::MemoryBackend;
pub use self::redis::RedisBackend;
