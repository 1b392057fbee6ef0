//! EligibilityResolver: is a player exempt from being nicknamed by others.
//!
//! Resolution order:
//!
//! 1. the remote `ExemptionProvider`, when one is configured (works offline)
//! 2. fallback: connected AND holding the exemption node, evaluated on the
//!    authoritative thread
//!
//! Provider faults and timeouts fall through to step 2; nothing propagates.

use nick_types::{ExemptionProvider, HostContext, Identity};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

pub const DEFAULT_EXEMPT_NODE: &str = "networknick.exempt";

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(4);

pub struct EligibilityResolver {
    host: Arc<dyn HostContext>,
    provider: Option<Arc<dyn ExemptionProvider>>,
    exempt_node: String,
    runtime: Handle,
}

impl EligibilityResolver {
    pub fn new(
        host: Arc<dyn HostContext>,
        provider: Option<Arc<dyn ExemptionProvider>>,
        exempt_node: impl Into<String>,
        runtime: Handle,
    ) -> Self {
        Self {
            host,
            provider,
            exempt_node: exempt_node.into(),
            runtime,
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Resolve off-thread, then deliver the answer on the authoritative thread.
    pub fn is_exempt<F>(self: &Arc<Self>, identity: Identity, callback: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let this = Arc::clone(self);
        self.runtime.spawn(async move {
            let exempt = this.resolve(identity).await;
            this.host.run_on_authoritative(Box::new(move || callback(exempt)));
        });
    }

    /// Resolve without the callback hop. Must not be awaited on the
    /// authoritative thread when the fallback may be needed.
    pub async fn resolve(&self, identity: Identity) -> bool {
        if let Some(provider) = &self.provider {
            match tokio::time::timeout(PROVIDER_TIMEOUT, provider.check_exempt(identity)).await {
                Ok(Ok(exempt)) => return exempt,
                Ok(Err(e)) => debug!(%identity, error = %e, "Exemption lookup failed, using online check"),
                Err(_) => warn!(%identity, "Exemption lookup timed out, using online check"),
            }
        }
        self.online_check(identity).await
    }

    async fn online_check(&self, identity: Identity) -> bool {
        let (tx, rx) = oneshot::channel();
        let host = Arc::clone(&self.host);
        let node = self.exempt_node.clone();
        self.host.run_on_authoritative(Box::new(move || {
            let exempt = host.is_connected(identity) && host.has_permission(identity, &node);
            let _ = tx.send(exempt);
        }));
        rx.await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nick_types::test_utils::ManualHost;
    use nick_types::{PlayerRef, ProviderError};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Fixed(Result<bool, ProviderError>);

    #[async_trait]
    impl ExemptionProvider for Fixed {
        async fn check_exempt(&self, _identity: Identity) -> Result<bool, ProviderError> {
            self.0.clone()
        }
    }

    fn resolver(
        host: &Arc<ManualHost>,
        provider: Option<Arc<dyn ExemptionProvider>>,
    ) -> Arc<EligibilityResolver> {
        let dyn_host: Arc<dyn HostContext> = host.clone();
        Arc::new(EligibilityResolver::new(
            dyn_host,
            provider,
            DEFAULT_EXEMPT_NODE,
            Handle::current(),
        ))
    }

    async fn resolve_driving(host: &Arc<ManualHost>, r: &Arc<EligibilityResolver>, id: Identity) -> bool {
        let r = r.clone();
        let task = tokio::spawn(async move { r.resolve(id).await });
        assert!(host.run_until(Duration::from_secs(2), || task.is_finished()).await);
        task.await.unwrap()
    }

    #[tokio::test]
    async fn test_provider_answer_wins_for_offline_player() {
        let host = Arc::new(ManualHost::new());
        let r = resolver(&host, Some(Arc::new(Fixed(Ok(true)))));
        assert!(r.resolve(Identity::random()).await);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back_to_online_check() {
        let host = Arc::new(ManualHost::new());
        let p = PlayerRef::new(Identity::random(), "Steve");
        host.connect(p.clone());
        host.grant(p.identity, DEFAULT_EXEMPT_NODE);

        let r = resolver(
            &host,
            Some(Arc::new(Fixed(Err(ProviderError::UserNotLoaded("x".into()))))),
        );
        assert!(resolve_driving(&host, &r, p.identity).await);
    }

    #[tokio::test]
    async fn test_offline_without_provider_is_never_exempt() {
        let host = Arc::new(ManualHost::new());
        let p = PlayerRef::new(Identity::random(), "Steve");
        host.remember(p.clone());
        host.grant(p.identity, DEFAULT_EXEMPT_NODE);

        let r = resolver(&host, None);
        assert!(!resolve_driving(&host, &r, p.identity).await);
    }

    #[tokio::test]
    async fn test_online_without_node_is_not_exempt() {
        let host = Arc::new(ManualHost::new());
        let p = PlayerRef::new(Identity::random(), "Steve");
        host.connect(p.clone());
        let r = resolver(&host, None);
        assert!(!resolve_driving(&host, &r, p.identity).await);
    }

    #[tokio::test]
    async fn test_callback_runs_on_authoritative_thread() {
        let host = Arc::new(ManualHost::new());
        let r = resolver(&host, Some(Arc::new(Fixed(Ok(false)))));

        let seen = Arc::new(AtomicBool::new(false));
        let on_auth = Arc::new(AtomicBool::new(false));
        {
            let seen = seen.clone();
            let on_auth = on_auth.clone();
            let observer = host.clone();
            r.is_exempt(Identity::random(), move |exempt| {
                assert!(!exempt);
                on_auth.store(observer.is_authoritative_thread(), Ordering::Release);
                seen.store(true, Ordering::Release);
            });
        }
        assert!(
            host.run_until(Duration::from_secs(2), || seen.load(Ordering::Acquire))
                .await
        );
        assert!(on_auth.load(Ordering::Acquire));
    }
}
