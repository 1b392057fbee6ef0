//! # NN-04 Hide
//!
//! - `EligibilityResolver`: whether another player may change someone's nickname
//! - `HideStateMachine`: hide/unhide with prior-nickname recovery
//!
//! Both talk to remote systems and are driven from async tasks; the resolver
//! delivers its callback on the host's authoritative thread.

pub mod config;
pub mod eligibility;
pub mod error;
pub mod machine;

pub use config::HideConfig;
pub use eligibility::{EligibilityResolver, DEFAULT_EXEMPT_NODE};
pub use error::HideError;
pub use machine::{HideOutcome, HideState, HideStateMachine};
