//! `chatbot` binary: joins Twitch chat and serves the command dashboard

use std::path::PathBuf;

use chatbot::{load_config, Config};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "chatbot")]
#[command(about = "Twitch chat command bot with a live dashboard")]
#[command(version)]
struct Args {
    /// JSON configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve the dashboard on this port instead of `dashboard.port`
    #[arg(long)]
    dashboard_port: Option<u16>,

    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

fn build_config(args: &Args) -> chatbot::Result<Config> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    config.resolve_secrets()?;

    if let Some(port) = args.dashboard_port {
        config.dashboard.port = port;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let config = build_config(&args)?;

    tracing::info!(
        "Joining {:?} on {} as {}",
        config.twitch.channels,
        config.twitch.irc_server,
        config.twitch.username
    );
    tracing::debug!(
        "Command database {:?}, dashboard {} on port {}",
        config.database.path,
        if config.dashboard.enabled { "enabled" } else { "disabled" },
        config.dashboard.port
    );

    chatbot::run(config).await?;

    Ok(())
}
