//! Twitch IRC line protocol
//!
//! Parses inbound chat lines and writes outbound commands over a
//! [`MessageWriter`](crate::io::MessageWriter).

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::TwitchConfig;
use crate::error::Result;
use crate::io::{ConnectionFactory, LineReader, MessageWriter};

static CHANNEL_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^:(?P<user>[^!\s]+)![^@\s]*@\S*\.tmi\.twitch\.tv PRIVMSG #(?P<channel>\S+) :(?P<message>.*)$",
    )
    .expect("channel message regex is valid")
});

/// A message from a specific channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub user: String,
    pub channel: String,
    pub message: String,
}

/// A parsed inbound IRC line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrcMessage {
    ChannelMessage(ChannelMessage),
    /// Server keep-alive; must be answered with `PONG`
    Ping(String),
    Unknown(String),
}

/// Parse one line received from the IRC server
pub fn parse_line(line: &str) -> IrcMessage {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(captures) = CHANNEL_MESSAGE.captures(line) {
        return IrcMessage::ChannelMessage(ChannelMessage {
            user: captures["user"].to_owned(),
            channel: captures["channel"].to_owned(),
            message: captures["message"].to_owned(),
        });
    }

    if let Some(server) = line.strip_prefix("PING ") {
        return IrcMessage::Ping(server.trim_start_matches(':').to_owned());
    }

    IrcMessage::Unknown(line.to_owned())
}

/// `PRIVMSG` bodies must stay on one line
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

pub fn pass_line(token: &str) -> String {
    format!("PASS {}", token)
}

pub fn nick_line(nickname: &str) -> String {
    format!("NICK {}", nickname)
}

pub fn join_line(channel: &str) -> String {
    format!("JOIN #{}", channel)
}

pub fn privmsg_line(channel: &str, message: &str) -> String {
    format!("PRIVMSG #{} :{}", channel, single_line(message))
}

pub fn pong_line(server: &str) -> String {
    format!("PONG :{}", server)
}

/// Anything that can post a message into a chat channel
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ChatSender: Send + Sync {
    async fn send_channel_message(&self, channel: &str, message: &str) -> Result<()>;
}

/// Cloneable handle that serialises writes to the IRC connection
#[derive(Clone)]
pub struct IrcSender {
    writer: Arc<Mutex<Box<dyn MessageWriter>>>,
}

impl std::fmt::Debug for IrcSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrcSender").finish_non_exhaustive()
    }
}

impl IrcSender {
    pub fn new(writer: Box<dyn MessageWriter>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Send a raw line; the writer appends CRLF
    pub async fn send_line(&self, line: &str) -> Result<()> {
        tracing::trace!("> {}", line);
        self.writer.lock().await.write_message(line).await
    }

    /// Join an IRC channel (`JOIN #<channel>`)
    pub async fn join(&self, channel: &str) -> Result<()> {
        debug!("Joining #{}", channel);
        self.send_line(&join_line(channel)).await
    }

    pub async fn pong(&self, server: &str) -> Result<()> {
        self.send_line(&pong_line(server)).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.writer.lock().await.shutdown().await
    }
}

#[async_trait]
impl ChatSender for IrcSender {
    async fn send_channel_message(&self, channel: &str, message: &str) -> Result<()> {
        self.send_line(&privmsg_line(channel, message)).await
    }
}

/// An authenticated IRC connection, split into its two directions
pub struct IrcSession {
    pub reader: Box<dyn LineReader>,
    pub sender: IrcSender,
}

impl IrcSession {
    /// Connect and log in; `PASS` is only sent when a token is configured
    pub async fn connect(factory: &dyn ConnectionFactory, config: &TwitchConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pair = factory.connect(&config.irc_server, timeout).await?;
        let sender = IrcSender::new(pair.writer);

        if !config.token.is_empty() {
            sender.send_line(&pass_line(&config.token)).await?;
        }
        sender.send_line(&nick_line(&config.username)).await?;

        info!("Connected to {} as {}", config.irc_server, config.username);

        Ok(Self {
            reader: pair.reader,
            sender,
        })
    }
}
