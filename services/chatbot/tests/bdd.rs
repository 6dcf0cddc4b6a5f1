//! BDD test entry point for chatbot service

#[path = "bdd/world.rs"]
mod world;

#[path = "bdd/steps/mod.rs"]
mod steps;

use cucumber::World as _;
use world::ChatbotWorld;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    ChatbotWorld::run("tests/features").await;
}
