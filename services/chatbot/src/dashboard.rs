//! Web dashboard with the commands JSON API and the live update socket

use std::path::PathBuf;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::debug;

use crate::store::{Command, CommandStore};
use crate::updates::{UpdateHub, UpdateSubscription};

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub store: CommandStore,
    pub hub: UpdateHub,
    /// Compiled Leptos site; its `pkg` directory is served under `/pkg`
    pub site_root: Option<PathBuf>,
}

impl DashboardState {
    pub fn new(store: CommandStore, hub: UpdateHub) -> Self {
        Self {
            store,
            hub,
            site_root: None,
        }
    }

    pub fn with_site_root(mut self, site_root: impl Into<PathBuf>) -> Self {
        self.site_root = Some(site_root.into());
        self
    }
}

/// Build the dashboard axum router
pub fn build_router(state: DashboardState) -> Router {
    let site_root = state.site_root.clone();

    let router = Router::new()
        .route("/", get(index_handler))
        .route("/api/commands", get(commands_handler))
        .route("/api/commands/", get(commands_handler))
        .route("/ws/update", get(update_socket_handler))
        .route("/ws/update/", get(update_socket_handler))
        .route("/health", get(health_handler));

    let router = match site_root {
        Some(root) => router.nest_service("/pkg", ServeDir::new(root.join("pkg"))),
        None => router,
    };

    router.layer(CorsLayer::permissive()).with_state(state)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn command_card(command: &Command) -> String {
    format!(
        r#"<li class="card blue-grey darken-1" data-key="{key}">
                <div class="card-content white-text">
                    <div class="card-title">{channel}</div>
                    Expr: <input type="text" value="{key}" onchange="logEdit(event)">
                    Command: <input type="text" value="{command}" onchange="logEdit(event)">
                </div>
            </li>"#,
        key = escape_html(&command.match_expr),
        channel = escape_html(&command.channel),
        command = escape_html(&command.command),
    )
}

/// Output name of the `chatbot-app` bundle under `<site_root>/pkg`
pub const BUNDLE_NAME: &str = "chatbot-dashboard";

/// Page that loads the Leptos bundle and mounts its `App`
fn app_shell() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Chatbot Dashboard</title>
    <script type="module">
        import init, {{ mount }} from '/pkg/{name}.js';
        await init({{ module_or_path: '/pkg/{name}_bg.wasm' }});
        mount();
    </script>
</head>
<body></body>
</html>"#,
        name = BUNDLE_NAME,
    )
}

async fn bundle_is_built(site_root: Option<&PathBuf>) -> bool {
    match site_root {
        Some(root) => {
            let script = root.join("pkg").join(format!("{}.js", BUNDLE_NAME));
            tokio::fs::try_exists(script).await.unwrap_or(false)
        }
        None => false,
    }
}

/// Mounts the Leptos app when its bundle is built, otherwise renders the
/// command cards on the server
async fn index_handler(State(dashboard): State<DashboardState>) -> Response {
    if bundle_is_built(dashboard.site_root.as_ref()).await {
        return Html(app_shell()).into_response();
    }

    let commands = match dashboard.store.list().await {
        Ok(commands) => commands,
        Err(e) => return internal_error(e),
    };

    let cards: String = commands.iter().map(command_card).collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Chatbot Dashboard</title>
    <script>
        function logEdit(event) {{
            console.log(event.target.value);
        }}
        window.addEventListener('load', () => {{
            const scheme = window.location.protocol === 'https:' ? 'wss://' : 'ws://';
            const socket = new WebSocket(scheme + window.location.host + '/ws/update/');
            let count = 0;
            socket.onmessage = (event) => {{
                console.log(event.data);
                count += 1;
                document.getElementById('stats_container').textContent = 'Message Count: ' + count;
            }};
        }});
    </script>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem;">
    <h1>Chatbot Dashboard</h1>
    <section id="stats_container">Message Count: 0</section>
    <section>
        <h2>Commands</h2>
        <ul class="container" id="commands_container">{cards}</ul>
    </section>
</body>
</html>"#,
        cards = cards,
    );

    Html(html).into_response()
}

async fn commands_handler(State(dashboard): State<DashboardState>) -> Response {
    match dashboard.store.list().await {
        Ok(commands) => Json(commands).into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: crate::ChatbotError) -> Response {
    tracing::warn!("Dashboard request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}

async fn update_socket_handler(
    ws: WebSocketUpgrade,
    State(dashboard): State<DashboardState>,
) -> impl IntoResponse {
    let subscription = dashboard.hub.subscribe();
    ws.on_upgrade(move |socket| update_session(socket, subscription))
}

/// Forward hub frames to one websocket client until either side goes away
async fn update_session(socket: WebSocket, mut subscription: UpdateSubscription) {
    let (mut outgoing, mut incoming) = socket.split();

    loop {
        tokio::select! {
            update = subscription.recv() => match update {
                Some(text) => {
                    if outgoing.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            frame = incoming.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    debug!("Unrecognized message: {}", text.as_str().trim());
                }
                Some(Ok(Message::Binary(_))) => {
                    debug!("Update socket cannot handle binary");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("Update client {} socket error: {}", subscription.id, e);
                    break;
                }
            },
        }
    }

    let _ = outgoing.close().await;
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
