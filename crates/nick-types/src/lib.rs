//! # Nick Types Crate
//!
//! Types shared by every network-nick subsystem:
//!
//! - `Identity` / `PlayerRef`: who a nickname belongs to.
//! - `ChangeNotification`: what the directory broadcasts on every write.
//! - `HostContext` / `PresentationSurface`: the call shape of the host process
//!   (authoritative thread, timers, connected players, name surfaces).
//! - `ExemptionProvider`: the offline-capable permission lookup.
//! - `NickError`: the user-facing failure taxonomy.
//!
//! ## Threading Contract
//!
//! The host owns exactly one authoritative thread. Anything that touches a
//! presentation surface or talks to a user runs there; network I/O never does.

pub mod entities;
pub mod errors;
pub mod host;
pub mod permissions;

/// Deterministic host double for tests.
/// Requires feature: `test-utils`
#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use entities::*;
pub use errors::*;
pub use host::{AuthoritativeTask, HostContext, PresentationSurface, RepeatingTask, SurfaceKind};
pub use permissions::ExemptionProvider;
