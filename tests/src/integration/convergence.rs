//! # Convergence
//!
//! Every process that has a player connected must end up mirroring the
//! directory's final value for that player, whichever write won.

#[cfg(test)]
mod tests {
    use crate::integration::network::{player, Network, WAIT};
    use rand::distributions::Alphanumeric;
    use rand::Rng;
    use std::time::Duration;

    fn random_nick() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_converge_on_final_value() {
        let net = Network::new();
        let a = net.process().await;
        let b = net.process().await;
        let c = net.process().await;

        let steve = player("Steve");
        for p in [&a, &b, &c] {
            p.join(&steve).await;
        }

        let dir_a = a.container.directory().current();
        let dir_b = b.container.directory().current();
        tokio::join!(
            dir_a.set(steve.identity, Some("Alex")),
            dir_b.set(steve.identity, Some("Zed")),
        );

        let winner = net.stored(steve.identity).expect("one write won");
        assert!(winner == "Alex" || winner == "Zed");
        for p in [&a, &b, &c] {
            assert!(p.wait_cached(steve.identity, Some(winner.as_str())).await);
            assert!(p.wait_shown(steve.identity, &winner).await);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_repeated_races_always_converge() {
        let net = Network::new();
        let a = net.process().await;
        let b = net.process().await;

        let steve = player("Steve");
        a.join(&steve).await;
        b.join(&steve).await;

        let dir_a = a.container.directory().current();
        let dir_b = b.container.directory().current();
        for _ in 0..5 {
            let (first, second) = (random_nick(), random_nick());
            tokio::join!(
                dir_a.set(steve.identity, Some(&first)),
                dir_b.set(steve.identity, Some(&second)),
            );
            let winner = net.stored(steve.identity);
            assert!(a.wait_cached(steve.identity, winner.as_deref()).await);
            assert!(b.wait_cached(steve.identity, winner.as_deref()).await);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_late_joiner_reads_existing_value() {
        let net = Network::new();
        let a = net.process().await;
        let steve = player("Steve");

        a.container
            .directory()
            .current()
            .set(steve.identity, Some("Bobby"))
            .await;

        let b = net.process().await;
        b.join(&steve).await;
        assert_eq!(b.cached(steve.identity).as_deref(), Some("Bobby"));
        assert_eq!(b.shown(steve.identity).as_deref(), Some("Bobby"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_moving_between_processes() {
        let net = Network::new();
        let a = net.process().await;
        let b = net.process().await;
        let steve = player("Steve");

        a.join(&steve).await;
        a.container
            .directory()
            .current()
            .set(steve.identity, Some("Bobby"))
            .await;
        assert!(a.wait_shown(steve.identity, "Bobby").await);

        a.leave(steve.identity);
        assert_eq!(a.cached(steve.identity), None);
        assert!(a.container.reconcile().state(steve.identity).is_none());

        b.join(&steve).await;
        assert_eq!(b.shown(steve.identity).as_deref(), Some("Bobby"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_clear_falls_back_to_real_name_everywhere() {
        let net = Network::new();
        let a = net.process().await;
        let b = net.process().await;
        let steve = player("Steve");
        a.join(&steve).await;
        b.join(&steve).await;

        let dir = a.container.directory().current();
        dir.set(steve.identity, Some("Bobby")).await;
        assert!(b.wait_shown(steve.identity, "Bobby").await);

        dir.set(steve.identity, None).await;
        assert_eq!(net.stored(steve.identity), None);
        for p in [&a, &b] {
            assert!(p.wait_shown(steve.identity, "Steve").await);
            assert_eq!(p.cached(steve.identity), None);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_subscription_recovers_after_outage() {
        let net = Network::new();
        let a = net.process().await;
        let b = net.process().await;
        let steve = player("Steve");
        a.join(&steve).await;

        net.backend().set_available(false);
        tokio::time::sleep(Duration::from_millis(200)).await;
        net.backend().set_available(true);

        // Writes are not replayed, so keep writing until the resubscribed
        // listener on `a` picks one up.
        let dir = b.container.directory().current();
        let deadline = tokio::time::Instant::now() + WAIT * 2;
        let mut seen = false;
        while !seen && tokio::time::Instant::now() < deadline {
            dir.set(steve.identity, Some("Back")).await;
            let presence = a.container.presence().clone();
            seen = a
                .host
                .run_until(Duration::from_millis(300), || {
                    presence.get_stored(steve.identity).as_deref() == Some("Back")
                })
                .await;
        }
        assert!(seen, "listener never came back after the outage");
    }
}
