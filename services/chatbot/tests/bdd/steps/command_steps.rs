//! BDD step definitions for chat meta commands

use std::sync::Arc;

use cucumber::{given, then, when};

use chatbot::processor::{CommandProcessor, MetaCommand};
use chatbot::store::{Command, CommandStore};

use crate::world::ChatbotWorld;

#[given("an empty command table")]
async fn empty_command_table(world: &mut ChatbotWorld) {
    let store = CommandStore::open_in_memory()
        .await
        .expect("in-memory database");
    world.cache.refresh(&store).await.unwrap();
    world.store = Some(store);
}

#[given(expr = "the command {string} in {string} answers {string}")]
async fn existing_command(
    world: &mut ChatbotWorld,
    match_expr: String,
    channel: String,
    command: String,
) {
    world
        .store()
        .upsert(&Command::new(channel, match_expr, command))
        .await
        .unwrap();
    world.cache.refresh(world.store()).await.unwrap();
}

#[when(expr = "{string} types {string} in {string}")]
async fn user_types_meta_command(
    world: &mut ChatbotWorld,
    user: String,
    message: String,
    channel: String,
) {
    let processor = CommandProcessor::new(
        world.store().clone(),
        world.cache.clone(),
        Arc::clone(&world.chat) as Arc<dyn chatbot::irc::ChatSender>,
    );
    world.last_reply = processor
        .handle(MetaCommand {
            channel,
            user,
            message,
        })
        .await;
}

#[then(expr = "the bot replies {string}")]
fn bot_replies(world: &mut ChatbotWorld, expected: String) {
    assert_eq!(world.last_reply.as_deref(), Some(expected.as_str()));
    let sent = world.chat.sent.lock().unwrap();
    assert_eq!(
        sent.last().map(|(_, message)| message.as_str()),
        Some(expected.as_str())
    );
}

#[then(expr = "the bot reply contains {string}")]
fn bot_reply_contains(world: &mut ChatbotWorld, expected: String) {
    let reply = world.last_reply.as_ref().expect("no reply");
    assert!(reply.contains(&expected), "reply was '{reply}'");
}

#[then("the bot stays silent")]
fn bot_stays_silent(world: &mut ChatbotWorld) {
    assert_eq!(world.last_reply, None);
    assert!(world.chat.sent.lock().unwrap().is_empty());
}

#[then(expr = "the command table contains {string} in {string} with {string}")]
async fn table_contains(
    world: &mut ChatbotWorld,
    match_expr: String,
    channel: String,
    command: String,
) {
    let commands = world.store().list_channel(&channel).await.unwrap();
    assert!(
        commands.contains(&Command::new(channel.clone(), match_expr.clone(), command.clone())),
        "expected {match_expr} -> {command} in #{channel}, table was {commands:?}"
    );

    let cached = world.cache.lookup(&channel, &match_expr).await;
    assert_eq!(cached.map(|c| c.command), Some(command));
}

#[then(expr = "the command table has {int} command(s)")]
async fn table_size(world: &mut ChatbotWorld, expected: usize) {
    assert_eq!(world.store().list().await.unwrap().len(), expected);
    assert_eq!(world.cache.len().await, expected);
}
