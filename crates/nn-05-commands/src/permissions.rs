//! Permission node names, all overridable from `[permissions]`.

use nn_01_text_codec::StyleNodes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PermissionNodes {
    pub nick: String,
    pub nick_clear: String,
    pub nick_others: String,
    pub nick_others_clear: String,
    pub hide: String,
    pub unhide: String,
    pub unhide_others: String,
    pub reload: String,
    pub exempt: String,
    /// Per style-class nodes checked by the validator.
    pub style: StyleNodes,
}

impl Default for PermissionNodes {
    fn default() -> Self {
        Self {
            nick: "networknick.nick".into(),
            nick_clear: "networknick.nick.clear".into(),
            nick_others: "networknick.nick.others".into(),
            nick_others_clear: "networknick.nick.others.clear".into(),
            hide: "networknick.hide".into(),
            unhide: "networknick.unhide".into(),
            unhide_others: "networknick.unhide.others".into(),
            reload: "networknick.reload".into(),
            exempt: "networknick.exempt".into(),
            style: StyleNodes::default(),
        }
    }
}
