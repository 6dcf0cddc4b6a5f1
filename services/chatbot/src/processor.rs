//! Meta commands typed in chat that edit the command table
//!
//! `#set <match> <command text>` stores a command for the current channel,
//! `#remove <match>` deletes it. The prefix is stripped before a line
//! reaches this module.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::cache::CommandCache;
use crate::irc::ChatSender;
use crate::store::{Command, CommandStore};

/// A prefixed chat line, prefix already removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaCommand {
    pub channel: String,
    pub user: String,
    pub message: String,
}

/// What a meta command asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaAction {
    Set { match_expr: String, command: String },
    Remove { match_expr: String },
    SetUsage,
    RemoveUsage,
}

/// Parse the text of a meta command; unknown verbs yield `None`
pub fn parse_meta(message: &str) -> Option<MetaAction> {
    let message = message.trim();
    let (verb, rest) = message
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((message, ""));

    match verb {
        "set" => match rest.split_once(char::is_whitespace) {
            Some((match_expr, command)) if !command.trim().is_empty() => Some(MetaAction::Set {
                match_expr: match_expr.to_string(),
                command: command.trim().to_string(),
            }),
            _ => Some(MetaAction::SetUsage),
        },
        "remove" => match rest.split_whitespace().next() {
            Some(match_expr) => Some(MetaAction::Remove {
                match_expr: match_expr.to_string(),
            }),
            None => Some(MetaAction::RemoveUsage),
        },
        _ => None,
    }
}

/// Applies meta commands to the store and answers in chat
pub struct CommandProcessor {
    store: CommandStore,
    cache: CommandCache,
    chat: Arc<dyn ChatSender>,
}

impl CommandProcessor {
    pub fn new(store: CommandStore, cache: CommandCache, chat: Arc<dyn ChatSender>) -> Self {
        Self { store, cache, chat }
    }

    /// Handle one meta command, returning the reply that was sent
    pub async fn handle(&self, meta: MetaCommand) -> Option<String> {
        let MetaCommand {
            channel,
            user,
            message,
        } = meta;

        let Some(action) = parse_meta(&message) else {
            debug!("Ignoring meta command from {} in #{}: {}", user, channel, message);
            return None;
        };

        let reply = match action {
            MetaAction::Set {
                match_expr,
                command,
            } => {
                let record = Command::new(channel.as_str(), match_expr, command);
                match self.store.upsert(&record).await {
                    Ok(rows) => {
                        self.refresh_if_changed(rows).await;
                        format!("@{} Command has been set!", user)
                    }
                    Err(e) => {
                        error!("Error with command {:?}: {}", record, e);
                        format!(
                            "@{} Command could not be set, ask the bot owner to check logs!",
                            user
                        )
                    }
                }
            }
            MetaAction::Remove { match_expr } => {
                match self.store.remove(&channel, &match_expr).await {
                    Ok(0) => format!("@{} No command named {}", user, match_expr),
                    Ok(rows) => {
                        self.refresh_if_changed(rows).await;
                        format!("@{} Command has been removed!", user)
                    }
                    Err(e) => {
                        error!("Error removing '{}' from #{}: {}", match_expr, channel, e);
                        format!(
                            "@{} Command could not be removed, ask the bot owner to check logs!",
                            user
                        )
                    }
                }
            }
            MetaAction::SetUsage => format!(
                "@{} set command should be in the form: \"#set match command\"!",
                user
            ),
            MetaAction::RemoveUsage => format!(
                "@{} remove command should be in the form: \"#remove match\"!",
                user
            ),
        };

        if let Err(e) = self.chat.send_channel_message(&channel, &reply).await {
            warn!("Failed to reply in #{}: {}", channel, e);
        }

        Some(reply)
    }

    async fn refresh_if_changed(&self, rows: u64) {
        if rows == 0 {
            return;
        }
        if let Err(e) = self.cache.refresh(&self.store).await {
            warn!("Command cache refresh failed: {}", e);
        }
    }
}
