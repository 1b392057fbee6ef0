//! # NN-03 Presence
//!
//! Keeps what this process renders for each online player in line with the
//! nickname directory.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | `SurfaceSet` | Presentation surfaces resolved once from the host |
//! | `PresenceCache` | Rendered value and mirrored stored value per identity |
//! | `PreConnectCache` | Values fetched before connect, consumed on connect |
//! | `ReconciliationLoop` | Connect-time apply, verify and bounded drift enforcement |
//!
//! ## Threading
//!
//! Directory reads run on the tokio runtime. Rendering happens only on the
//! host's authoritative thread; results are marshalled there with
//! `HostContext::run_on_authoritative`.

pub mod cache;
pub mod config;
pub mod prefetch;
pub mod reconcile;
pub mod surfaces;

pub use cache::PresenceCache;
pub use config::{ApplyConfig, EnforceConfig};
pub use prefetch::PreConnectCache;
pub use reconcile::{ReconciliationLoop, SessionState};
pub use surfaces::SurfaceSet;
