//! Line transport under the IRC session
//!
//! Twitch chat is plain CRLF-terminated text over TCP. Reading and writing
//! go through small traits so the bot loop can be driven by scripted
//! lines in tests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{ChatbotError, Result};

/// Both halves of one chat connection
pub struct ConnectionPair {
    pub reader: Box<dyn LineReader>,
    pub writer: Box<dyn MessageWriter>,
}

/// Inbound side: one server line at a time
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait LineReader: Send {
    /// Next line without its terminator, or `None` once the server hangs up
    async fn read_line(&mut self) -> Result<Option<String>>;
}

pub struct TcpLineReader {
    reader: BufReader<ReadHalf<TcpStream>>,
    buffer: String,
}

impl TcpLineReader {
    pub fn new(reader: ReadHalf<TcpStream>) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: String::new(),
        }
    }
}

#[async_trait]
impl LineReader for TcpLineReader {
    async fn read_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer).await {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(
                self.buffer.trim_end_matches(['\r', '\n']).to_string(),
            )),
            Err(e) => Err(ChatbotError::Io(e)),
        }
    }
}

/// Outbound side
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait MessageWriter: Send {
    /// Send `message` followed by CRLF and flush it
    async fn write_message(&mut self, message: &str) -> Result<()>;

    async fn shutdown(&mut self) -> Result<()>;
}

pub struct TcpMessageWriter {
    writer: WriteHalf<TcpStream>,
}

impl TcpMessageWriter {
    pub fn new(writer: WriteHalf<TcpStream>) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl MessageWriter for TcpMessageWriter {
    async fn write_message(&mut self, message: &str) -> Result<()> {
        self.writer
            .write_all(format!("{}\r\n", message).as_bytes())
            .await
            .map_err(|e| ChatbotError::Irc(format!("Could not write line: {}", e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| ChatbotError::Irc(format!("Could not flush line: {}", e)))?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await.map_err(ChatbotError::Io)
    }
}

/// Opens chat connections; the bot only ever sees this trait
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionFactory: Send + Sync {
    /// Connect to `addr` (host:port), giving up after `timeout`
    async fn connect(&self, addr: &str, timeout: Duration) -> Result<ConnectionPair>;
}

/// Plain TCP, as used by `irc.chat.twitch.tv:6667`
#[derive(Debug, Default, Clone)]
pub struct TcpConnectionFactory;

impl TcpConnectionFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConnectionFactory for TcpConnectionFactory {
    async fn connect(&self, addr: &str, timeout: Duration) -> Result<ConnectionPair> {
        debug!("Dialing {} (timeout {:?})", addr, timeout);

        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ChatbotError::Timeout(format!("Connection to {} timed out", addr)))?
            .map_err(|e| {
                ChatbotError::ConnectionFailed(format!("Failed to connect to {}: {}", addr, e))
            })?;

        let (reader, writer) = tokio::io::split(stream);

        Ok(ConnectionPair {
            reader: Box::new(TcpLineReader::new(reader)),
            writer: Box::new(TcpMessageWriter::new(writer)),
        })
    }
}
