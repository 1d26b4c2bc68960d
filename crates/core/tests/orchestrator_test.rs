mod common;

use std::sync::Arc;

use common::{FakePlatform, GUILD, at, monday_training, orchestrator};
use pretty_assertions::assert_eq;
use rollcall_core::memory::MemoryStore;
use rollcall_core::models::{Attendance, IncomingMessage, ReactionAdded};
use rollcall_core::ports::RecordStore;
use rollcall_core::render::parse_answer_lines;

fn message(author: &str, content: &str) -> IncomingMessage {
    IncomingMessage {
        author_id: author.to_string(),
        author_is_bot: false,
        content: content.to_string(),
        channel_id: "c-general".to_string(),
        guild_id: Some(GUILD.to_string()),
    }
}

fn reaction(message_id: &str, user_id: &str, symbol: &str) -> ReactionAdded {
    ReactionAdded {
        guild_id: GUILD.to_string(),
        channel_id: "c-general".to_string(),
        message_id: message_id.to_string(),
        user_id: user_id.to_string(),
        user_is_bot: false,
        symbol: symbol.to_string(),
    }
}

fn platform() -> Arc<FakePlatform> {
    Arc::new(
        FakePlatform::new()
            .with_member("admin", "Ada", false)
            .with_member("a", "Alice", false)
            .with_member("bot", "Rollcall", true)
            .with_admin("admin"),
    )
}

#[test_log::test(tokio::test)]
async fn test_ready_provisions_metadata_and_channel() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![monday_training()]);

    orchestrator
        .on_ready("bot", &[GUILD.to_string(), "guild-2".to_string()], at(2026, 10, 19, 8, 0))
        .await;

    assert_eq!(orchestrator.bot_user_id(), Some("bot"));
    for guild in [GUILD, "guild-2"] {
        let metadata = store.find_metadata(guild).await.unwrap().unwrap();
        assert_eq!(metadata.channel_name, "general");
        assert_eq!(platform.channels(guild).len(), 1);
    }

    // a second ready event creates nothing new
    orchestrator
        .on_ready("bot", &[GUILD.to_string()], at(2026, 10, 19, 8, 5))
        .await;
    assert_eq!(store.list_metadata().await.unwrap().len(), 2);
    assert_eq!(platform.channels(GUILD).len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_tick_announces_and_reactions_are_tallied() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![monday_training()]);
    orchestrator.on_ready("bot", &[GUILD.to_string()], at(2026, 10, 18, 20, 0)).await;

    orchestrator.tick(at(2026, 10, 19, 8, 0)).await;
    assert_eq!(store.event_count(), 0);

    orchestrator.tick(at(2026, 10, 19, 17, 0)).await;
    orchestrator.tick(at(2026, 10, 19, 17, 1)).await;
    let events = store.list_events(GUILD).await.unwrap();
    assert_eq!(events.len(), 1);
    let message_id = events[0].message_id.clone();

    // the bot's own affordances are not answers
    orchestrator
        .on_reaction_added(&reaction(&message_id, "bot", "✅"), at(2026, 10, 19, 17, 2))
        .await;
    assert_eq!(store.answer_count(), 0);

    orchestrator
        .on_reaction_added(&reaction(&message_id, "a", "✅"), at(2026, 10, 19, 17, 3))
        .await;
    orchestrator
        .on_reaction_added(&reaction(&message_id, "a", "❌"), at(2026, 10, 19, 17, 4))
        .await;

    assert_eq!(store.answer_count(), 1);
    assert_eq!(
        parse_answer_lines(&platform.body(&message_id).unwrap()),
        vec![("Alice".to_string(), Attendance::No)]
    );
}

#[tokio::test]
async fn test_unrecognized_reactions_are_stripped_from_tracked_events_only() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![monday_training()]);
    orchestrator.on_ready("bot", &[GUILD.to_string()], at(2026, 10, 19, 8, 0)).await;
    orchestrator.tick(at(2026, 10, 19, 17, 0)).await;
    let message_id = store.list_events(GUILD).await.unwrap()[0].message_id.clone();

    orchestrator
        .on_reaction_added(&reaction(&message_id, "a", "🎉"), at(2026, 10, 19, 17, 5))
        .await;
    orchestrator
        .on_reaction_added(&reaction("random-chatter", "a", "🎉"), at(2026, 10, 19, 17, 5))
        .await;

    assert_eq!(store.answer_count(), 0);
    assert_eq!(
        platform.removed_reactions(),
        vec![(message_id, "🎉".to_string(), "a".to_string())]
    );
}

#[tokio::test]
async fn test_forcing_commands_require_admin() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![]);
    orchestrator.on_ready("bot", &[GUILD.to_string()], at(2026, 10, 19, 8, 0)).await;

    orchestrator.on_message(&message("a", "!event"), at(2026, 10, 19, 9, 0)).await;
    orchestrator.on_message(&message("a", "!resetWeek"), at(2026, 10, 19, 9, 0)).await;
    assert_eq!(store.event_count(), 0);
    assert!(platform.sent().is_empty());

    orchestrator
        .on_message(
            &message("admin", "!event Sparring; 2026-10-20 19:00; 20:30; Gloves; Dojo"),
            at(2026, 10, 19, 9, 0),
        )
        .await;
    let events = store.list_events(GUILD).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Sparring");
    assert_eq!(events[0].location, "Dojo");
}

#[tokio::test]
async fn test_reset_week_forces_a_summary() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![]);
    orchestrator.on_ready("bot", &[GUILD.to_string()], at(2026, 10, 21, 8, 0)).await;

    let now = at(2026, 10, 21, 9, 0);
    orchestrator.on_message(&message("admin", "!resetWeek"), now).await;

    let metadata = store.find_metadata(GUILD).await.unwrap().unwrap();
    assert_eq!(metadata.last_week_reset, Some(now));
    let sent = platform.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.starts_with("**Weekly summary**"));
}

#[tokio::test]
async fn test_check_runs_lifecycle_then_rollover() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![monday_training()]);
    orchestrator.on_ready("bot", &[GUILD.to_string()], at(2026, 10, 19, 8, 0)).await;

    orchestrator.on_message(&message("admin", "!check"), at(2026, 10, 19, 17, 0)).await;

    assert_eq!(store.event_count(), 1);
    let metadata = store.find_metadata(GUILD).await.unwrap().unwrap();
    assert_eq!(metadata.last_week_reset, Some(at(2026, 10, 19, 17, 0)));
    // announcement first, then the summary
    let sent = platform.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].1.starts_with("**Training**"));
    assert!(sent[1].1.starts_with("**Weekly summary**"));
}

#[tokio::test]
async fn test_ping_is_answered_for_anyone_and_bots_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![]);
    orchestrator.on_ready("bot", &[], at(2026, 10, 19, 8, 0)).await;

    orchestrator.on_message(&message("a", "ping"), at(2026, 10, 19, 9, 0)).await;
    orchestrator.on_message(&message("bot", "pong"), at(2026, 10, 19, 9, 0)).await;

    assert_eq!(
        platform.sent(),
        vec![("c-general".to_string(), "Pong!".to_string())]
    );
}

#[tokio::test]
async fn test_ready_sweeps_reactions_missed_while_offline() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![monday_training()]);
    orchestrator.on_ready("bot", &[GUILD.to_string()], at(2026, 10, 19, 8, 0)).await;
    orchestrator.tick(at(2026, 10, 19, 17, 0)).await;
    let message_id = store.list_events(GUILD).await.unwrap()[0].message_id.clone();

    platform.set_reaction_users(&message_id, "❓", &["bot", "a"]);
    orchestrator.on_ready("bot", &[GUILD.to_string()], at(2026, 10, 19, 17, 30)).await;

    assert_eq!(
        parse_answer_lines(&platform.body(&message_id).unwrap()),
        vec![("Alice".to_string(), Attendance::Maybe)]
    );
}

#[tokio::test]
async fn test_guild_joined_after_ready_gets_scheduled_events() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![monday_training()]);
    orchestrator.on_ready("bot", &[GUILD.to_string()], at(2026, 10, 19, 8, 0)).await;

    orchestrator.on_guild_available("late-guild", at(2026, 10, 19, 12, 0)).await;
    let metadata = store.find_metadata("late-guild").await.unwrap().unwrap();
    assert_eq!(metadata.channel_name, "general");
    let channel = platform.channels("late-guild")[0].id.clone();

    for minute in 0..60 {
        orchestrator.tick(at(2026, 10, 19, 17, minute)).await;
    }

    let sent: Vec<String> = platform
        .sent()
        .into_iter()
        .filter(|(channel_id, _)| *channel_id == channel)
        .map(|(_, text)| text)
        .collect();
    // the announcement, then the first Monday summary
    assert_eq!(sent.len(), 2);
    assert!(sent[0].starts_with("**Training**"));
    assert!(sent[1].starts_with("**Weekly summary**"));
    assert_eq!(store.list_events("late-guild").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reactions_from_other_bots_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    let platform = platform();
    let orchestrator = orchestrator(&store, &platform, vec![monday_training()]);
    orchestrator.on_ready("bot", &[GUILD.to_string()], at(2026, 10, 19, 8, 0)).await;
    orchestrator.tick(at(2026, 10, 19, 17, 0)).await;
    let message_id = store.list_events(GUILD).await.unwrap()[0].message_id.clone();

    let from_bot = ReactionAdded {
        user_is_bot: true,
        ..reaction(&message_id, "other-bot", "✅")
    };
    orchestrator.on_reaction_added(&from_bot, at(2026, 10, 19, 17, 5)).await;

    assert_eq!(store.answer_count(), 0);
    assert!(platform.removed_reactions().is_empty());
}
