//! # Enforcement Window
//!
//! For a bounded number of ticks after connecting, anything else on the host
//! that overwrites the rendered name is undone.

#[cfg(test)]
mod tests {
    use crate::integration::network::{player, Network};
    use nn_03_presence::SessionState;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_drift_is_corrected_while_enforcing() {
        let net = Network::new();
        let lobby = net.process().await;
        let steve = player("Steve");
        lobby
            .container
            .directory()
            .current()
            .set(steve.identity, Some("Bobby"))
            .await;
        lobby.join(&steve).await;
        assert_eq!(lobby.shown(steve.identity).as_deref(), Some("Bobby"));

        lobby.surface.overwrite(steve.identity, "SomeOtherPlugin");
        let period = lobby.container.config().enforce.period_ticks;
        lobby.host.advance(period);
        assert_eq!(lobby.shown(steve.identity).as_deref(), Some("Bobby"));
        assert_eq!(
            lobby.container.reconcile().state(steve.identity),
            Some(SessionState::Enforcing(1))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_drift_after_settling_is_left_alone() {
        let net = Network::new();
        let lobby = net.process().await;
        let steve = player("Steve");
        lobby.join(&steve).await;

        let enforce = lobby.container.config().enforce;
        lobby
            .host
            .advance(enforce.period_ticks * u64::from(enforce.max_runs));
        assert_eq!(
            lobby.container.reconcile().state(steve.identity),
            Some(SessionState::Settled)
        );
        assert_eq!(lobby.host.scheduled(), 0);

        lobby.surface.overwrite(steve.identity, "SomeOtherPlugin");
        lobby.host.advance(enforce.period_ticks * 2);
        assert_eq!(
            lobby.shown(steve.identity).as_deref(),
            Some("SomeOtherPlugin")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_leaving_cancels_enforcement() {
        let net = Network::new();
        let lobby = net.process().await;
        let steve = player("Steve");
        lobby.join(&steve).await;
        assert_eq!(lobby.host.scheduled(), 1);

        lobby.leave(steve.identity);
        assert_eq!(lobby.host.scheduled(), 0);
        assert!(lobby.container.reconcile().state(steve.identity).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_change_during_enforcement_becomes_the_target() {
        let net = Network::new();
        let lobby = net.process().await;
        let survival = net.process().await;
        let steve = player("Steve");
        lobby.join(&steve).await;

        survival
            .container
            .directory()
            .current()
            .set(steve.identity, Some("Later"))
            .await;
        assert!(lobby.wait_shown(steve.identity, "Later").await);

        lobby.surface.overwrite(steve.identity, "Steve");
        lobby
            .host
            .advance(lobby.container.config().enforce.period_ticks);
        assert_eq!(lobby.shown(steve.identity).as_deref(), Some("Later"));
    }
}
