//! # Permission Provider Port
//!
//! Offline-capable permission lookups (e.g. a network-wide permissions
//! service). The online-only fallback lives on `HostContext::has_permission`.

use crate::entities::Identity;
use crate::errors::ProviderError;
use async_trait::async_trait;

/// Remote provider that can answer "is this identity exempt" for offline players.
#[async_trait]
pub trait ExemptionProvider: Send + Sync {
    /// Evaluate the exemption permission using the provider's effective context.
    async fn check_exempt(&self, identity: Identity) -> Result<bool, ProviderError>;
}
