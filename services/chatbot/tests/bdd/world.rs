//! BDD test world for chatbot service

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatbot::cache::CommandCache;
use chatbot::irc::ChatSender;
use chatbot::store::CommandStore;
use cucumber::World;

/// Chat sender that records `(channel, message)` pairs
#[derive(Debug, Default)]
pub struct RecordingChat {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ChatSender for RecordingChat {
    async fn send_channel_message(&self, channel: &str, message: &str) -> chatbot::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), message.to_string()));
        Ok(())
    }
}

#[derive(Debug, Default, World)]
pub struct ChatbotWorld {
    // Command table
    pub store: Option<CommandStore>,
    pub cache: CommandCache,
    pub chat: Arc<RecordingChat>,
    pub last_reply: Option<String>,

    // Dashboard testing
    pub response_status: Option<u16>,
    pub response_body: Option<String>,
}

impl ChatbotWorld {
    pub fn store(&self) -> &CommandStore {
        self.store.as_ref().expect("command table not set up")
    }
}
