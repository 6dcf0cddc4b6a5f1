//! Client-side API types and endpoint helpers
//!
//! These types mirror the server-side JSON response structures
//! and are shared between SSR and client-side hydration.

use serde::{Deserialize, Serialize};

/// Path of the commands listing endpoint
pub const COMMANDS_PATH: &str = "/api/commands/";

/// Path of the live update socket
pub const UPDATE_SOCKET_PATH: &str = "/ws/update/";

/// Command record as returned by /api/commands/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub channel: String,
    pub match_expr: String,
    pub command: String,
}

impl CommandRecord {
    /// Display key: the match expression, qualified by its channel
    pub fn key(&self) -> (String, String) {
        (self.channel.clone(), self.match_expr.clone())
    }
}

/// URL of the commands listing for a page served from `origin`
pub fn commands_url(origin: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), COMMANDS_PATH)
}

/// Websocket URL of the update socket for a page at `protocol`//`host`
///
/// `protocol` is `window.location.protocol`, e.g. `"https:"`.
pub fn update_socket_url(protocol: &str, host: &str) -> String {
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    format!("{}://{}{}", scheme, host, UPDATE_SOCKET_PATH)
}
