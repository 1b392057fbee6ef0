//! # NN-05 Commands
//!
//! User entry points over the validator, the directory and the hide state
//! machine.
//!
//! | Command | Node |
//! |---------|------|
//! | `/nick <name\|off>` | `networknick.nick` (+ `.nick.clear`, style nodes) |
//! | `/nick <player> <name\|off>` | `networknick.nick.others` / `.nick.others.clear` |
//! | `/hide` | `networknick.hide` |
//! | `/unhide [player]` | `networknick.unhide` / `.unhide.others` |
//! | `/networknick reload` | `networknick.reload` |
//!
//! ## Threading
//!
//! Entry points are called on the host's authoritative thread. Permission
//! checks, target resolution and validation happen there; directory and
//! exemption work is spawned on the runtime and every reply is marshalled back
//! through `HostContext::run_on_authoritative`.

pub mod complete;
pub mod context;
pub mod hide;
pub mod messages;
pub mod nick;
pub mod permissions;
pub mod placeholders;
pub mod reload;
pub mod router;
pub mod target;

#[cfg(test)]
mod testing;

pub use complete::NickCompleter;
pub use context::{CommandContext, CommandSettings, Dispatch, PlayerCapabilities};
pub use hide::{HideCommand, UnhideCommand};
pub use messages::{MessageCatalog, MessageKey};
pub use nick::{is_clear_word, NickChange, NickCommand, CLEAR_WORDS};
pub use permissions::PermissionNodes;
pub use placeholders::{Placeholders, PLACEHOLDER_PREFIX};
pub use reload::{ReloadCommand, ReloadError, Reloadable};
pub use router::{CommandRouter, LABELS};
pub use target::TargetResolver;
