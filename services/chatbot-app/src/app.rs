//! Main App component

use crate::components::command_list::CommandList;
use crate::components::message_counter::MessageCounter;
use leptos::prelude::*;
use leptos_meta::{provide_meta_context, Title};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Chatbot Dashboard" />
        <main style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem;">
            <h1>"Chatbot Dashboard"</h1>
            <MessageCounter />
            <CommandList />
        </main>
    }
}
