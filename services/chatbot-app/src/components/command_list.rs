//! Command cards component

use crate::api::CommandRecord;
use leptos::logging::log;
use leptos::prelude::*;

/// Fetches /api/commands/ once and renders each command as an editable card
///
/// Edits are only logged; nothing is written back to the server.
#[component]
pub fn CommandList() -> impl IntoView {
    let commands = Resource::new(
        || (),
        |_| async move {
            fetch_commands().await.unwrap_or_else(|e| {
                log!("Could not load commands: {}", e);
                Vec::new()
            })
        },
    );

    view! {
        <section>
            <h2>"Commands"</h2>
            <Suspense fallback=move || view! { <p>"Loading commands..."</p> }>
                {move || {
                    commands.get().map(|data| {
                        view! {
                            <ul class="container">
                                <For
                                    each=move || data.clone()
                                    key=|record| record.key()
                                    children=move |record| view! { <CommandCard record=record /> }
                                />
                            </ul>
                        }
                    })
                }}
            </Suspense>
        </section>
    }
}

/// One command: channel as title, expression and command as text inputs
#[component]
fn CommandCard(record: CommandRecord) -> impl IntoView {
    let CommandRecord {
        channel,
        match_expr,
        command,
    } = record;
    let expr_key = match_expr.clone();
    let command_key = match_expr.clone();

    view! {
        <li class="card blue-grey darken-1">
            <div class="card-content white-text">
                <div class="card-title">{channel}</div>
                "Expr: "
                <input
                    type="text"
                    prop:value=match_expr
                    on:input=move |ev| log!("{} expr -> {}", expr_key, event_target_value(&ev))
                />
                "Command: "
                <input
                    type="text"
                    prop:value=command
                    on:input=move |ev| log!("{} command -> {}", command_key, event_target_value(&ev))
                />
            </div>
        </li>
    }
}

async fn fetch_commands() -> Result<Vec<CommandRecord>, String> {
    // In SSR mode, this returns empty (server populates via initial state)
    // In hydrate/CSR mode, this fetches from the JSON API
    #[cfg(feature = "hydrate")]
    {
        let window = web_sys::window().ok_or("no window")?;
        let origin = window.location().origin().map_err(|e| format!("{:?}", e))?;
        let url = crate::api::commands_url(&origin);

        let resp = gloo_net::http::Request::get(&url)
            .send()
            .await
            .map_err(|e| format!("{}", e))?;

        resp.json().await.map_err(|e| format!("{}", e))
    }

    #[cfg(not(feature = "hydrate"))]
    {
        Ok(vec![])
    }
}
