//! Error types for the chatbot service

/// Errors that can occur in the chatbot service
#[derive(Debug, thiserror::Error)]
pub enum ChatbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IRC error: {0}")]
    Irc(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dashboard error: {0}")]
    Dashboard(String),
}

/// Result type alias for chatbot operations
pub type Result<T> = std::result::Result<T, ChatbotError>;
