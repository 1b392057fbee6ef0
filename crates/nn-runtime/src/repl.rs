//! Line-oriented control of the development host.
//!
//! ```text
//! join <name> [uuid]          connect a player (pre-connect read first)
//! leave <name>                disconnect
//! grant <name> <node>         give a permission node ("*" for all)
//! revoke <name> <node>
//! as <name> /<cmd> [args..]   run a command as that player
//! /<cmd> [args..]             run a command as the console
//! complete <name> /<cmd> ..   tab-complete the last argument
//! who                         online players and what they show
//! placeholder <name> <param>  expand %networknick_<param>%
//! help | quit
//! ```

use crate::console::ConsoleHost;
use crate::container::NickContainer;
use nick_types::{CommandSource, HostContext, Identity, PlayerRef};
use nn_01_text_codec::{strip, to_native};
use nn_05_commands::{CommandRouter, Dispatch};
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing::{debug, warn};

const HELP: &str = "join <name> [uuid] | leave <name> | grant <name> <node> | revoke <name> <node> | \
as <name> /<cmd> [args] | /<cmd> [args] | complete <name> /<cmd> [args] | who | \
placeholder <name> <param> | quit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a UUID: {0}")]
    InvalidIdentity(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Join {
        name: String,
        identity: Option<Identity>,
    },
    Leave {
        name: String,
    },
    Grant {
        name: String,
        node: String,
    },
    Revoke {
        name: String,
        node: String,
    },
    As {
        name: String,
        label: String,
        args: Vec<String>,
    },
    Console {
        label: String,
        args: Vec<String>,
    },
    Complete {
        name: String,
        label: String,
        args: Vec<String>,
    },
    Who,
    Placeholder {
        name: String,
        param: String,
    },
    Help,
    Quit,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn label(word: &str) -> String {
    word.trim_start_matches('/').to_string()
}

/// `Ok(None)` for blank lines. A trailing space on `complete` lines means
/// an empty last argument.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = words.split_first() else {
        return Ok(None);
    };

    if let Some(stripped) = head.strip_prefix('/') {
        if stripped.is_empty() {
            return Err(ParseError::Usage("/<cmd> [args]"));
        }
        return Ok(Some(ConsoleCommand::Console {
            label: stripped.to_string(),
            args: owned(rest),
        }));
    }

    let command = match (head.to_ascii_lowercase().as_str(), rest) {
        ("join", [name]) => ConsoleCommand::Join {
            name: name.to_string(),
            identity: None,
        },
        ("join", [name, id]) => ConsoleCommand::Join {
            name: name.to_string(),
            identity: Some(
                id.parse()
                    .map_err(|_| ParseError::InvalidIdentity(id.to_string()))?,
            ),
        },
        ("join", _) => return Err(ParseError::Usage("join <name> [uuid]")),
        ("leave", [name]) => ConsoleCommand::Leave {
            name: name.to_string(),
        },
        ("leave", _) => return Err(ParseError::Usage("leave <name>")),
        ("grant", [name, node]) => ConsoleCommand::Grant {
            name: name.to_string(),
            node: node.to_string(),
        },
        ("grant", _) => return Err(ParseError::Usage("grant <name> <node>")),
        ("revoke", [name, node]) => ConsoleCommand::Revoke {
            name: name.to_string(),
            node: node.to_string(),
        },
        ("revoke", _) => return Err(ParseError::Usage("revoke <name> <node>")),
        ("as", [name, cmd, args @ ..]) => ConsoleCommand::As {
            name: name.to_string(),
            label: label(cmd),
            args: owned(args),
        },
        ("as", _) => return Err(ParseError::Usage("as <name> /<cmd> [args]")),
        ("complete", [name, cmd, args @ ..]) => {
            let mut args = owned(args);
            if line.ends_with(char::is_whitespace) {
                args.push(String::new());
            }
            ConsoleCommand::Complete {
                name: name.to_string(),
                label: label(cmd),
                args,
            }
        }
        ("complete", _) => return Err(ParseError::Usage("complete <name> /<cmd> [args]")),
        ("who", []) => ConsoleCommand::Who,
        ("placeholder", [name, param]) => ConsoleCommand::Placeholder {
            name: name.to_string(),
            param: param.to_string(),
        },
        ("placeholder", _) => return Err(ParseError::Usage("placeholder <name> <param>")),
        ("help", _) => ConsoleCommand::Help,
        ("quit" | "exit" | "stop", _) => ConsoleCommand::Quit,
        _ => return Err(ParseError::Unknown(head.to_string())),
    };
    Ok(Some(command))
}

pub struct ConsoleSession {
    host: Arc<ConsoleHost>,
    container: Arc<NickContainer>,
    router: Arc<CommandRouter>,
}

impl ConsoleSession {
    pub fn new(host: Arc<ConsoleHost>, container: Arc<NickContainer>) -> Self {
        let router = Arc::new(container.router());
        Self {
            host,
            container,
            router,
        }
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run_stdin(&self) -> io::Result<()> {
        println!("{HELP}");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match parse(&line) {
                Ok(Some(command)) => {
                    if !self.handle(command).await {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => println!("{e}"),
            }
        }
        Ok(())
    }

    /// Run one command. `false` once the session should end.
    pub async fn handle(&self, command: ConsoleCommand) -> bool {
        debug!(?command, "Console input");
        match command {
            ConsoleCommand::Join { name, identity } => self.join(name, identity).await,
            ConsoleCommand::Leave { name } => match self.host.find_online_by_name(&name) {
                Some(player) => {
                    let container = Arc::clone(&self.container);
                    let host = Arc::clone(&self.host);
                    self.host.run_on_authoritative(Box::new(move || {
                        container.on_disconnect(player.identity);
                        host.disconnect(player.identity);
                    }));
                }
                None => println!("{name} is not online"),
            },
            ConsoleCommand::Grant { name, node } => match self.known(&name) {
                Some(player) => self.host.grant(player.identity, &node),
                None => println!("Unknown player {name}"),
            },
            ConsoleCommand::Revoke { name, node } => match self.known(&name) {
                Some(player) => self.host.revoke(player.identity, &node),
                None => println!("Unknown player {name}"),
            },
            ConsoleCommand::As { name, label, args } => match self.host.find_online_by_name(&name) {
                Some(player) => self.dispatch(CommandSource::Player(player), label, args).await,
                None => println!("{name} is not online"),
            },
            ConsoleCommand::Console { label, args } => {
                self.dispatch(CommandSource::Console, label, args).await
            }
            ConsoleCommand::Complete { name, label, args } => {
                match self.host.find_online_by_name(&name) {
                    Some(player) => {
                        let args: Vec<&str> = args.iter().map(String::as_str).collect();
                        let options =
                            self.router
                                .complete(&CommandSource::Player(player), &label, &args);
                        println!("{}", options.join(" "));
                    }
                    None => println!("{name} is not online"),
                }
            }
            ConsoleCommand::Who => self.who(),
            ConsoleCommand::Placeholder { name, param } => match self.known(&name) {
                Some(player) => match self.router.placeholders().resolve(&player, &param).await {
                    Some(value) => println!("{value}"),
                    None => println!("Unknown placeholder param {param}"),
                },
                None => println!("Unknown player {name}"),
            },
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => return false,
        }
        true
    }

    fn known(&self, name: &str) -> Option<PlayerRef> {
        self.host
            .find_online_by_name(name)
            .or_else(|| self.host.offline_player(name))
    }

    async fn join(&self, name: String, identity: Option<Identity>) {
        if self.host.find_online_by_name(&name).is_some() {
            println!("{name} is already online");
            return;
        }
        let identity = identity
            .or_else(|| self.host.offline_player(&name).map(|p| p.identity))
            .unwrap_or_else(Identity::random);
        let player = PlayerRef::new(identity, name);

        self.container.pre_connect(identity).await;
        let container = Arc::clone(&self.container);
        let host = Arc::clone(&self.host);
        self.host.run_on_authoritative(Box::new(move || {
            host.connect(player.clone());
            container.on_connect(player);
        }));
    }

    /// Commands start on the authoritative thread like a host command would.
    async fn dispatch(&self, source: CommandSource, label: String, args: Vec<String>) {
        let (tx, rx) = oneshot::channel::<Option<Dispatch>>();
        let router = Arc::clone(&self.router);
        self.host.run_on_authoritative(Box::new(move || {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let _ = tx.send(router.dispatch(&source, &label, &args));
        }));

        match rx.await {
            Ok(Some(dispatch)) => dispatch.finished().await,
            Ok(None) => println!("Unknown command. Labels: /nick /hide /unhide /networknick reload"),
            Err(_) => warn!("Authoritative thread stopped before the command ran"),
        }
    }

    fn who(&self) {
        let online = self.host.online_players();
        if online.is_empty() {
            println!("Nobody online");
        }
        let presence = self.container.presence();
        for player in online {
            let visible = to_native(&presence.get_visible(player.identity, &player.name));
            let shown = self
                .host
                .shown(player.identity)
                .map(|s| strip(&s))
                .unwrap_or_default();
            let hidden = if presence.is_hidden(player.identity) {
                " (hidden)"
            } else {
                ""
            };
            println!(
                "{} {} visible={} shown={}{}",
                player.name, player.identity, visible, shown, hidden
            );
        }
    }
}
