//! Chatbot - Twitch chat command bot
//!
//! Answers chat with stored commands, lets chatters edit them with meta
//! commands, and serves a live dashboard of the command table.

pub mod bot;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod irc;
pub mod processor;
pub mod store;
pub mod updates;

pub use config::{load_config, Config};
pub use error::{ChatbotError, Result};

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bot::Bot;
use crate::cache::CommandCache;
use crate::config::DashboardConfig;
use crate::dashboard::DashboardState;
use crate::io::TcpConnectionFactory;
use crate::irc::IrcSession;
use crate::processor::CommandProcessor;
use crate::store::CommandStore;
use crate::updates::UpdateHub;

/// Run the chatbot service with the given configuration
///
/// Returns once the chat connection closes or ctrl-c is received. The
/// dashboard is stopped and the database closed before this returns,
/// on error paths too.
pub async fn run(config: Config) -> Result<()> {
    let store = CommandStore::open(&config.database.path).await?;

    let result = run_with_store(&config, store.clone()).await;

    store.close().await;
    tracing::info!("Chatbot stopped");
    result
}

async fn run_with_store(config: &Config, store: CommandStore) -> Result<()> {
    let cache = CommandCache::new();
    cache.refresh(&store).await?;
    tracing::info!("Loaded {} commands", cache.len().await);

    // Nothing is served until the chat login went through
    let session = IrcSession::connect(&TcpConnectionFactory::new(), &config.twitch).await?;
    let sender = session.sender.clone();

    let cancel = CancellationToken::new();
    let hub = UpdateHub::default();

    let cancel_for_signal = cancel.clone();
    let signal_task = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
        }
        cancel_for_signal.cancel();
    });

    let dashboard = if config.dashboard.enabled {
        let state = DashboardState::new(store.clone(), hub.clone())
            .with_site_root(config.dashboard.site_root.clone());
        start_dashboard(&config.dashboard, state, cancel.clone()).await
    } else {
        None
    };

    let processor = CommandProcessor::new(store, cache.clone(), Arc::new(sender.clone()));
    let mut bot = Bot::new(
        session,
        processor,
        cache,
        hub,
        config.twitch.channels.clone(),
        config.commands.meta_prefix.clone(),
        cancel.clone(),
    );

    tracing::info!("Chatbot started");
    let result = bot.run().await;
    drop(bot);

    cancel.cancel();
    signal_task.abort();
    if let Some(handle) = dashboard {
        if let Err(e) = handle.await {
            tracing::error!("Dashboard task failed: {}", e);
        }
    }
    if let Err(e) = sender.shutdown().await {
        tracing::debug!("IRC writer shutdown: {}", e);
    }

    result
}

/// Bind the dashboard port and serve until `cancel` fires
///
/// A port that cannot be bound is logged and the bot carries on without
/// a dashboard.
async fn start_dashboard(
    config: &DashboardConfig,
    state: DashboardState,
    cancel: CancellationToken,
) -> Option<JoinHandle<()>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                config.port,
                e
            );
            return None;
        }
    };
    tracing::info!("Dashboard listening on http://{}", addr);

    let router = dashboard::build_router(state);
    Some(tokio::spawn(async move {
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await;
        if let Err(e) = served {
            tracing::error!("Dashboard server failed: {}", e);
        }
        tracing::debug!("Dashboard stopped");
    }))
}
