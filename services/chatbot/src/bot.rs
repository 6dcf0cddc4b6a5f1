//! Bot: routes chat lines to the processor, the command cache and the update hub

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::cache::CommandCache;
use crate::error::Result;
use crate::io::LineReader;
use crate::irc::{parse_line, ChannelMessage, ChatSender, IrcMessage, IrcSender, IrcSession};
use crate::processor::{CommandProcessor, MetaCommand};
use crate::updates::UpdateHub;

/// Reads the IRC connection until it closes or the token is cancelled
pub struct Bot {
    reader: Box<dyn LineReader>,
    sender: IrcSender,
    processor: CommandProcessor,
    cache: CommandCache,
    hub: UpdateHub,
    channels: Vec<String>,
    meta_prefix: String,
    cancel: CancellationToken,
}

impl Bot {
    pub fn new(
        session: IrcSession,
        processor: CommandProcessor,
        cache: CommandCache,
        hub: UpdateHub,
        channels: Vec<String>,
        meta_prefix: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            reader: session.reader,
            sender: session.sender,
            processor,
            cache,
            hub,
            channels,
            meta_prefix: meta_prefix.into(),
            cancel,
        }
    }

    /// Join the configured channels, then handle lines until EOF or cancel
    pub async fn run(&mut self) -> Result<()> {
        for channel in &self.channels {
            self.sender.join(channel).await?;
        }

        loop {
            let line = tokio::select! {
                line = self.reader.read_line() => line?,
                _ = self.cancel.cancelled() => {
                    debug!("Bot loop cancelled");
                    break;
                }
            };

            match line {
                Some(line) => self.handle_line(&line).await,
                None => {
                    info!("IRC connection closed by server");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle one raw line from the server
    pub async fn handle_line(&self, line: &str) {
        match parse_line(line) {
            IrcMessage::Ping(server) => {
                if let Err(e) = self.sender.pong(&server).await {
                    warn!("Failed to answer PING: {}", e);
                }
            }
            IrcMessage::ChannelMessage(message) => self.handle_channel_message(message).await,
            IrcMessage::Unknown(line) => trace!("< {}", line),
        }
    }

    async fn handle_channel_message(&self, message: ChannelMessage) {
        debug!("{:?}", message);

        if let Some(rest) = message.message.strip_prefix(self.meta_prefix.as_str()) {
            self.processor
                .handle(MetaCommand {
                    channel: message.channel,
                    user: message.user,
                    message: rest.trim().to_owned(),
                })
                .await;
            return;
        }

        match serde_json::to_string(&message) {
            Ok(frame) => {
                let reached = self.hub.publish(frame);
                trace!("Chat line pushed to {} dashboard clients", reached);
            }
            Err(e) => warn!("Could not encode chat line for the dashboard: {}", e),
        }

        let Some(word) = message.message.split_whitespace().next() else {
            return;
        };
        if let Some(command) = self.cache.lookup(&message.channel, word).await {
            debug!("'{}' matched in #{}", word, message.channel);
            if let Err(e) = self
                .sender
                .send_channel_message(&message.channel, &command.command)
                .await
            {
                warn!("Failed to send '{}' in #{}: {}", word, message.channel, e);
            }
        }
    }
}
