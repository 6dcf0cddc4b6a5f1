//! Chatbot Dashboard - Leptos frontend
//!
//! Lists the bot's stored commands and counts live chat updates. The
//! dashboard server hands out a bare page that imports the compiled
//! bundle from `/pkg` and calls [`mount`].

pub mod api;
pub mod app;
pub mod components;

pub use app::App;

/// WASM entry point: renders [`App`] into `<body>`
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn mount() {
    leptos::mount::mount_to_body(App);
}
