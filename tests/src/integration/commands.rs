//! # Command Flows
//!
//! A command on one process writes the directory; every process holding the
//! target re-renders from the broadcast.

#[cfg(test)]
mod tests {
    use crate::integration::network::{player, Network};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_nick_on_one_process_renders_on_another() {
        let net = Network::new();
        let lobby = net.process().await;
        let survival = net.process().await;

        let steve = player("Steve");
        lobby.join(&steve).await;
        survival.join(&steve).await;
        lobby.host.grant(steve.identity, "networknick.nick");

        lobby.command(Some(&steve), "nick", &["Bobby"]).await;
        assert_eq!(net.stored(steve.identity).as_deref(), Some("Bobby"));
        assert!(lobby
            .last_reply(Some(&steve))
            .unwrap()
            .contains("Bobby"));
        assert!(survival.wait_shown(steve.identity, "Bobby").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_staff_renames_player_on_another_process() {
        let net = Network::new();
        let lobby = net.process().await;
        let survival = net.process().await;

        let steve = player("Steve");
        let admin = player("Admin");
        survival.join(&steve).await;
        lobby.join(&admin).await;
        lobby.host.grant_all(admin.identity);
        // Steve played on the lobby before, so it can resolve him offline.
        lobby.host.remember(steve.clone());

        lobby
            .command(Some(&admin), "nick", &["Steve", "&cRob"])
            .await;
        assert_eq!(net.stored(steve.identity).as_deref(), Some("&cRob"));
        assert!(survival.wait_shown(steve.identity, "&cRob").await);

        lobby.command(Some(&admin), "nick", &["Steve", "off"]).await;
        assert_eq!(net.stored(steve.identity), None);
        assert!(survival.wait_shown(steve.identity, "Steve").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_denied_command_writes_nothing() {
        let net = Network::new();
        let lobby = net.process().await;
        let steve = player("Steve");
        lobby.join(&steve).await;

        lobby.command(Some(&steve), "nick", &["Bobby"]).await;
        assert_eq!(net.stored(steve.identity), None);
        assert_eq!(lobby.shown(steve.identity).as_deref(), Some("Steve"));

        lobby.host.grant(steve.identity, "networknick.nick");
        lobby.command(Some(&steve), "nick", &["&cBobby"]).await;
        assert_eq!(net.stored(steve.identity), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reload_applies_new_length_limit() {
        let net = Network::new();
        let lobby = net.process().await;
        let steve = player("Steve");
        lobby.join(&steve).await;
        lobby.host.grant(steve.identity, "networknick.nick");

        net.configure(|c| c.nick.max_length = 5);
        lobby.command(None, "networknick", &["reload"]).await;
        assert!(lobby.last_reply(None).unwrap().contains("reloaded"));
        assert!(net.wait_listeners(&lobby, 1).await);

        lobby
            .command(Some(&steve), "nick", &["Abcdefghij"])
            .await;
        assert_eq!(net.stored(steve.identity).as_deref(), Some("Abcde"));
        assert!(lobby.wait_shown(steve.identity, "Abcde").await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reload_keeps_process_listening() {
        let net = Network::new();
        let lobby = net.process().await;
        let survival = net.process().await;
        let steve = player("Steve");
        lobby.join(&steve).await;

        lobby.command(None, "networknick", &["reload"]).await;
        assert!(net.wait_listeners(&lobby, 2).await);
        survival
            .container
            .directory()
            .current()
            .set(steve.identity, Some("After"))
            .await;
        assert!(lobby.wait_shown(steve.identity, "After").await);
    }
}
