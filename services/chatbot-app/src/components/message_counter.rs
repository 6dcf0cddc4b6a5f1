//! Live update counter component

use leptos::prelude::*;

/// Opens the update socket and counts every frame it receives
#[component]
pub fn MessageCounter() -> impl IntoView {
    let (count, set_count) = signal(0u64);

    // Effects only run in the browser, so the socket is never opened during SSR
    Effect::new(move |_| open_update_socket(set_count));

    view! {
        <section>"Message Count: " {count}</section>
    }
}

#[cfg(feature = "hydrate")]
fn open_update_socket(set_count: WriteSignal<u64>) {
    use futures_util::StreamExt;
    use gloo_net::websocket::futures::WebSocket;
    use leptos::logging::log;

    let Some(window) = web_sys::window() else {
        return;
    };
    let location = window.location();
    let (Ok(protocol), Ok(host)) = (location.protocol(), location.host()) else {
        log!("Could not read page location");
        return;
    };

    let url = crate::api::update_socket_url(&protocol, &host);
    let mut socket = match WebSocket::open(&url) {
        Ok(socket) => socket,
        Err(e) => {
            log!("Could not open {}: {:?}", url, e);
            return;
        }
    };

    leptos::task::spawn_local(async move {
        while let Some(frame) = socket.next().await {
            match frame {
                Ok(message) => {
                    log!("{:?}", message);
                    set_count.update(|n| *n += 1);
                }
                Err(e) => log!("Update socket error: {:?}", e),
            }
        }
    });
}

#[cfg(not(feature = "hydrate"))]
fn open_update_socket(_set_count: WriteSignal<u64>) {}
