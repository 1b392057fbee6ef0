//! # Hiding Across Processes
//!
//! Hide state lives in the directory, so a player hidden on one process is
//! hidden everywhere and can be unhidden from anywhere.

#[cfg(test)]
mod tests {
    use crate::integration::network::{player, Network};
    use nn_01_text_codec::{is_hide_nick, DEFAULT_MAX_VISIBLE_LEN};
    use nn_04_hide::HideConfig;

    fn hidden_value() -> String {
        HideConfig::default().hidden_value(DEFAULT_MAX_VISIBLE_LEN)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_hide_here_unhide_there() {
        let net = Network::new();
        let lobby = net.process().await;
        let survival = net.process().await;

        let steve = player("Steve");
        lobby.join(&steve).await;
        survival.join(&steve).await;
        for node in ["networknick.nick", "networknick.hide"] {
            lobby.host.grant(steve.identity, node);
        }
        survival.host.grant(steve.identity, "networknick.unhide");

        lobby.command(Some(&steve), "nick", &["Bobby"]).await;
        lobby.command(Some(&steve), "hide", &[]).await;

        let hidden = hidden_value();
        assert_eq!(net.stored(steve.identity), Some(hidden.clone()));
        assert_eq!(net.stored_prior(steve.identity).as_deref(), Some("Bobby"));
        assert!(survival.wait_shown(steve.identity, &hidden).await);
        assert!(survival.container.presence().is_hidden(steve.identity));

        let placeholders = survival.router.placeholders();
        assert_eq!(
            placeholders.resolve(&steve, "hidden").await.as_deref(),
            Some("true")
        );
        assert_eq!(
            placeholders.resolve(&steve, "unhidden").await.as_deref(),
            Some("Bobby")
        );

        survival.command(Some(&steve), "unhide", &[]).await;
        assert_eq!(net.stored(steve.identity).as_deref(), Some("Bobby"));
        assert_eq!(net.stored_prior(steve.identity), None);
        assert!(lobby.wait_shown(steve.identity, "Bobby").await);
        assert!(!lobby.container.presence().is_hidden(steve.identity));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_hide_without_nick_unhides_to_real_name() {
        let net = Network::new();
        let lobby = net.process().await;
        let steve = player("Steve");
        lobby.join(&steve).await;
        lobby.host.grant(steve.identity, "networknick.hide");

        lobby.command(Some(&steve), "hide", &[]).await;
        let stored = net.stored(steve.identity).unwrap();
        assert!(is_hide_nick(&stored));
        assert_eq!(net.stored_prior(steve.identity), None);

        lobby.command(Some(&steve), "hide", &[]).await;
        assert_eq!(net.stored(steve.identity), None);
        assert!(lobby.wait_shown(steve.identity, "Steve").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_staff_unhides_player_on_another_process() {
        let net = Network::new();
        let lobby = net.process().await;
        let survival = net.process().await;

        let steve = player("Steve");
        let admin = player("Admin");
        survival.join(&steve).await;
        survival.host.grant(steve.identity, "networknick.hide");
        lobby.join(&admin).await;
        lobby.host.grant_all(admin.identity);
        lobby.host.remember(steve.clone());

        survival
            .container
            .directory()
            .current()
            .set(steve.identity, Some("Bobby"))
            .await;
        survival.command(Some(&steve), "hide", &[]).await;
        assert!(survival.wait_shown(steve.identity, &hidden_value()).await);

        lobby.command(Some(&admin), "unhide", &["Steve"]).await;
        assert_eq!(net.stored(steve.identity).as_deref(), Some("Bobby"));
        assert!(lobby.last_reply(Some(&admin)).unwrap().contains("Steve"));
        assert!(survival.wait_shown(steve.identity, "Bobby").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_console_cannot_hide() {
        let net = Network::new();
        let lobby = net.process().await;
        lobby.command(None, "hide", &[]).await;
        assert_eq!(lobby.last_reply(None).as_deref(), Some("Players only."));
    }
}
