//! Merges single reactions into an event's answer set.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::errors::RollcallResult;
use crate::find_or_create::find_or_create;
use crate::locks::KeyedLocks;
use crate::models::{Answer, Attendance, Event, ReactionAdded, ReactionSymbol, User};
use crate::ports::{ChatPlatform, RecordStore};
use crate::render::render_event;

pub struct AttendanceReconciler {
    store: Arc<dyn RecordStore>,
    platform: Arc<dyn ChatPlatform>,
    timezone: Tz,
    event_locks: KeyedLocks,
}

impl AttendanceReconciler {
    pub fn new(store: Arc<dyn RecordStore>, platform: Arc<dyn ChatPlatform>, timezone: Tz) -> Self {
        Self {
            store,
            platform,
            timezone,
            event_locks: KeyedLocks::new(),
        }
    }

    /// Records the reacting user's answer on the event announced by the
    /// reacted-to message.
    ///
    /// Returns `Ok(None)` when the message is not a tracked event or the
    /// symbol carries no attendance meaning. On success the event message is
    /// re-rendered and the reaction consumed; failures of those two follow-ups
    /// are logged but do not undo the stored answer.
    pub async fn record_answer(
        &self,
        reaction: &ReactionAdded,
        now: DateTime<Utc>,
    ) -> RollcallResult<Option<Answer>> {
        let Some(yes_no) = ReactionSymbol::parse(&reaction.symbol).attendance() else {
            debug!(symbol = %reaction.symbol, "ignoring unrecognized reaction");
            return Ok(None);
        };

        let _guard = self.event_locks.lock(&event_key(&reaction.guild_id, &reaction.message_id)).await;

        let Some(event) = self
            .store
            .find_event(&reaction.guild_id, &reaction.message_id)
            .await?
        else {
            debug!(message_id = %reaction.message_id, "reaction on untracked message");
            return Ok(None);
        };

        let answer = self.store_answer(&event, &reaction.user_id, yes_no, now).await?;
        info!(
            event = %event.name,
            user = %reaction.user_id,
            answer = %answer.yes_no,
            "recorded answer"
        );

        if let Err(e) = self.refresh_message(&event).await {
            warn!("Failed to re-render event {}: {}", event.message_id, e);
        }
        if let Err(e) = self
            .platform
            .remove_user_reaction(&event.message(), &reaction.symbol, &reaction.user_id)
            .await
        {
            warn!("Failed to remove reaction on {}: {}", event.message_id, e);
        }

        Ok(Some(answer))
    }

    /// Picks up reactions placed while nobody was listening.
    ///
    /// Every recognized reaction on the event message, except the bot's own
    /// affordances, is stored as an answer and consumed. Returns the number
    /// of answers recorded.
    pub async fn sweep_reactions(
        &self,
        event: &Event,
        bot_user_id: &str,
        now: DateTime<Utc>,
    ) -> RollcallResult<usize> {
        let _guard = self.event_locks.lock(&event_key(&event.guild_id, &event.message_id)).await;
        let message = event.message();
        let mut recorded = 0;

        for yes_no in Attendance::ALL {
            let users = match self.platform.list_reaction_users(&message, yes_no.symbol()).await {
                Ok(users) => users,
                Err(e) => {
                    warn!("Failed to list {} reactions on {}: {}", yes_no, event.message_id, e);
                    continue;
                }
            };
            for user_id in users.iter().filter(|id| id.as_str() != bot_user_id) {
                match self.store_answer(event, user_id, yes_no, now).await {
                    Ok(_) => recorded += 1,
                    Err(e) => {
                        warn!("Failed to record swept answer of {}: {}", user_id, e);
                        continue;
                    }
                }
                if let Err(e) = self
                    .platform
                    .remove_user_reaction(&message, yes_no.symbol(), user_id)
                    .await
                {
                    warn!("Failed to remove swept reaction of {}: {}", user_id, e);
                }
            }
        }

        if recorded > 0 {
            info!(event = %event.name, recorded, "swept pending reactions");
            self.refresh_message(event).await?;
        }
        Ok(recorded)
    }

    /// Re-renders the full event message from the stored answers.
    pub async fn refresh_message(&self, event: &Event) -> RollcallResult<()> {
        let answers = self.store.list_answers(event.id).await?;
        let users = self.store.list_users(&event.guild_id).await?;
        let text = render_event(event, &answers, &users, &self.timezone);
        self.platform.edit_message(&event.message(), &text).await
    }

    async fn store_answer(
        &self,
        event: &Event,
        member_id: &str,
        yes_no: Attendance,
        now: DateTime<Utc>,
    ) -> RollcallResult<Answer> {
        let profile = self.platform.resolve_user(&event.guild_id, member_id).await?;
        let user = self.resolve_stored_user(&event.guild_id, member_id, &profile.display_name).await?;

        let mut answer = self
            .store
            .find_answer(event.id, user.id)
            .await?
            .unwrap_or_else(|| Answer::new(event.id, user.id));
        answer.yes_no = yes_no;
        answer.updated_at = now;

        self.store.upsert_answer(&answer).await
    }

    async fn resolve_stored_user(
        &self,
        guild_id: &str,
        member_id: &str,
        display_name: &str,
    ) -> RollcallResult<User> {
        let store = self.store.as_ref();
        let new_user = User::new(guild_id, member_id, display_name);
        let mut user = find_or_create(
            move || store.find_user(guild_id, member_id),
            || store.create_user(&new_user),
        )
        .await?;

        if user.display_name != display_name {
            store.update_user_name(user.id, display_name).await?;
            user.display_name = display_name.to_string();
        }
        Ok(user)
    }
}

fn event_key(guild_id: &str, message_id: &str) -> String {
    format!("{}:{}", guild_id, message_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RollcallError;
    use crate::memory::MemoryStore;
    use crate::models::{EventDraft, MessageRef};
    use crate::ports::MockChatPlatform;
    use chrono::{Duration, TimeZone};

    async fn tracked_event(store: &MemoryStore) -> Event {
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap();
        let event = EventDraft {
            name: "Training".to_string(),
            description: String::new(),
            location: String::new(),
            start_time: start,
            end_time: start + Duration::hours(1),
        }
        .into_event("guild", "channel", "message");
        store.create_event(&event).await.unwrap()
    }

    fn reaction(symbol: &str) -> ReactionAdded {
        ReactionAdded {
            guild_id: "guild".to_string(),
            channel_id: "channel".to_string(),
            message_id: "message".to_string(),
            user_id: "alice".to_string(),
            user_is_bot: false,
            symbol: symbol.to_string(),
        }
    }

    #[tokio::test]
    async fn user_lookup_failure_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        tracked_event(&store).await;

        let mut platform = MockChatPlatform::new();
        platform
            .expect_resolve_user()
            .returning(|_, _| Err(RollcallError::platform(eyre::eyre!("gateway timeout"))));
        platform.expect_edit_message().never();
        platform.expect_remove_user_reaction().never();

        let reconciler = AttendanceReconciler::new(store.clone(), Arc::new(platform), Tz::UTC);
        let result = reconciler.record_answer(&reaction("✅"), Utc::now()).await;

        assert!(matches!(result, Err(RollcallError::Platform(_))));
        assert_eq!(store.answer_count(), 0);
        assert!(store.list_users("guild").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn render_failure_keeps_the_answer() {
        let store = Arc::new(MemoryStore::new());
        tracked_event(&store).await;

        let mut platform = MockChatPlatform::new();
        platform.expect_resolve_user().returning(|_, _| {
            Ok(crate::models::UserProfile {
                display_name: "Alice".to_string(),
            })
        });
        platform
            .expect_edit_message()
            .times(1)
            .returning(|_, _| Err(RollcallError::platform(eyre::eyre!("missing access"))));
        platform
            .expect_remove_user_reaction()
            .withf(|message: &MessageRef, symbol: &str, user: &str| {
                message.message_id == "message" && symbol == "❌" && user == "alice"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let reconciler = AttendanceReconciler::new(store.clone(), Arc::new(platform), Tz::UTC);
        let answer = reconciler
            .record_answer(&reaction("❌"), Utc::now())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(answer.yes_no, Attendance::No);
        assert_eq!(store.answer_count(), 1);
    }

    #[tokio::test]
    async fn sweep_refreshes_after_a_failed_listing() {
        let store = Arc::new(MemoryStore::new());
        let event = tracked_event(&store).await;

        let mut platform = MockChatPlatform::new();
        platform
            .expect_list_reaction_users()
            .returning(|_, symbol| match symbol {
                "✅" => Ok(vec!["bot".to_string(), "alice".to_string()]),
                "❌" => Err(RollcallError::platform(eyre::eyre!("rate limited"))),
                _ => Ok(vec!["bob".to_string()]),
            });
        platform.expect_resolve_user().returning(|_, user| {
            Ok(crate::models::UserProfile {
                display_name: user.to_uppercase(),
            })
        });
        platform
            .expect_remove_user_reaction()
            .times(2)
            .returning(|_, _, _| Ok(()));
        platform
            .expect_edit_message()
            .withf(|message: &MessageRef, text: &str| {
                message.message_id == "message" && text.contains("ALICE") && text.contains("BOB")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let reconciler = AttendanceReconciler::new(store.clone(), Arc::new(platform), Tz::UTC);
        let recorded = reconciler.sweep_reactions(&event, "bot", Utc::now()).await.unwrap();

        assert_eq!(recorded, 2);
        assert_eq!(store.answer_count(), 2);
    }

    #[tokio::test]
    async fn unrecognized_symbol_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        tracked_event(&store).await;

        let platform = MockChatPlatform::new();
        let reconciler = AttendanceReconciler::new(store.clone(), Arc::new(platform), Tz::UTC);

        assert_eq!(reconciler.record_answer(&reaction("🎉"), Utc::now()).await.unwrap(), None);
        assert_eq!(store.answer_count(), 0);
    }
}
