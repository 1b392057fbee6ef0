//! Wire contract with the shared store.
//!
//! ```text
//! <nick-prefix><uuid>   -> raw nickname        (absent = key deleted)
//! <prior-prefix><uuid>  -> raw nickname
//! channel payload       =  "<uuid>|<raw nickname or empty>"
//! ```

use crate::config::KeyLayout;
use nick_types::{ChangeNotification, Identity};

impl KeyLayout {
    pub fn nick_key(&self, identity: Identity) -> String {
        format!("{}{}", self.nick_prefix, identity)
    }

    pub fn prior_key(&self, identity: Identity) -> String {
        format!("{}{}", self.prior_prefix, identity)
    }
}

/// Encode a change for the broadcast channel.
pub fn encode_update(identity: Identity, nick: Option<&str>) -> String {
    format!("{}|{}", identity, nick.unwrap_or(""))
}

/// Decode a channel payload. `None` when the identity does not parse.
///
/// A missing or blank nickname segment means "clear".
pub fn decode_update(payload: &str) -> Option<ChangeNotification> {
    let (id, nick) = payload.split_once('|').unwrap_or((payload, ""));
    let identity: Identity = id.parse().ok()?;
    Some(ChangeNotification::new(identity, Some(nick.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    #[test]
    fn test_key_layout() {
        let layout = KeyLayout::default();
        let id: Identity = ID.parse().unwrap();
        assert_eq!(layout.nick_key(id), format!("networknick:nick:{ID}"));
        assert_eq!(layout.prior_key(id), format!("networknick:prior:{ID}"));
    }

    #[test]
    fn test_encode_clear_has_empty_tail() {
        let id: Identity = ID.parse().unwrap();
        assert_eq!(encode_update(id, None), format!("{ID}|"));
        assert_eq!(encode_update(id, Some("&aBob")), format!("{ID}|&aBob"));
    }

    #[test]
    fn test_decode_set_and_clear() {
        let set = decode_update(&format!("{ID}|&aBob")).unwrap();
        assert_eq!(set.nick.as_deref(), Some("&aBob"));

        let clear = decode_update(&format!("{ID}|")).unwrap();
        assert_eq!(clear.nick, None);

        let bare = decode_update(ID).unwrap();
        assert_eq!(bare.nick, None);
    }

    #[test]
    fn test_decode_keeps_pipes_in_nick() {
        let n = decode_update(&format!("{ID}|a|b")).unwrap();
        assert_eq!(n.nick.as_deref(), Some("a|b"));
    }

    #[test]
    fn test_decode_ignores_bad_identity() {
        assert!(decode_update("nope|Bob").is_none());
        assert!(decode_update("").is_none());
    }
}
