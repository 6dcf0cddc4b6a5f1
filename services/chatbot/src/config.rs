//! Configuration types for the chatbot service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `twitch.token`
pub const TOKEN_ENV_VAR: &str = "TWITCH_TOKEN";

/// Environment variable that overrides `twitch.username`
pub const USERNAME_ENV_VAR: &str = "TWITCH_USERNAME";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub twitch: TwitchConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
}

impl Config {
    /// Pull secrets from the process environment
    pub fn resolve_secrets(&mut self) -> crate::Result<()> {
        self.resolve_secrets_with(|key| std::env::var(key).ok())
    }

    /// Pull secrets through `lookup`, then check the result is usable
    pub fn resolve_secrets_with<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV_VAR).filter(|t| !t.is_empty()) {
            tracing::debug!("Using Twitch token from {}", TOKEN_ENV_VAR);
            self.twitch.token = token;
        }
        if let Some(username) = lookup(USERNAME_ENV_VAR).filter(|u| !u.is_empty()) {
            self.twitch.username = username;
        }

        if self.twitch.username.is_empty() {
            return Err(crate::ChatbotError::Config(
                "twitch.username must be set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Twitch chat connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_irc_server")]
    pub irc_server: String,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_seconds: u64,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            token: String::new(),
            irc_server: default_irc_server(),
            channels: Vec::new(),
            connection_timeout_seconds: default_connection_timeout(),
        }
    }
}

/// Command table storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    /// Output directory of the compiled Leptos site, served under `/pkg`
    #[serde(default = "default_site_root")]
    pub site_root: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
            site_root: default_site_root(),
        }
    }
}

/// Chat command handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Chat lines starting with this prefix edit the command table
    #[serde(default = "default_meta_prefix")]
    pub meta_prefix: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            meta_prefix: default_meta_prefix(),
        }
    }
}

fn default_irc_server() -> String {
    "irc.chat.twitch.tv:6667".to_string()
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_database_path() -> PathBuf {
    PathBuf::from("chatbot.sqlite3")
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    8080
}

fn default_site_root() -> PathBuf {
    PathBuf::from("target/site")
}

fn default_meta_prefix() -> String {
    "#".to_string()
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::ChatbotError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
