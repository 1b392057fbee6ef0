//! # NetworkNick Test Suite
//!
//! Runs several processes in one test: each gets its own `ManualHost` and
//! `NickContainer`, all sharing one `MemoryBackend` as the directory.
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── network.rs      # Multi-process fixture
//!     ├── convergence.rs  # Concurrent writes, reconnects, outages
//!     ├── commands.rs     # /nick, /networknick reload end to end
//!     ├── hiding.rs       # /hide and /unhide across processes
//!     └── enforcement.rs  # Drift correction on the enforcement timer
//! ```
//!
//! ```bash
//! cargo test -p nn-tests
//! ```

#![allow(dead_code)]

pub mod integration;
