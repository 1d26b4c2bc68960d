//! Collaborator interfaces the scheduling core depends on.
//!
//! The record store and the chat platform are both external. The core only
//! talks to them through these traits, so the same logic runs against
//! PostgreSQL and Discord in production and against in-memory fakes in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::errors::RollcallResult;
use crate::models::{Answer, Channel, Event, Member, MessageRef, Metadata, User, UserProfile};

/// Persistence for metadata, events, users and answers.
///
/// Creates report [`RollcallError::Conflict`](crate::errors::RollcallError::Conflict)
/// when a natural key is already taken.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_metadata(&self, guild_id: &str) -> RollcallResult<Option<Metadata>>;

    async fn create_metadata(&self, metadata: &Metadata) -> RollcallResult<Metadata>;

    async fn list_metadata(&self) -> RollcallResult<Vec<Metadata>>;

    /// Sets `last_week_reset` to `next` only if it still equals `previous`.
    ///
    /// Returns `false` when another writer got there first.
    async fn update_last_week_reset(
        &self,
        guild_id: &str,
        previous: Option<DateTime<Utc>>,
        next: DateTime<Utc>,
    ) -> RollcallResult<bool>;

    async fn create_event(&self, event: &Event) -> RollcallResult<Event>;

    /// Looks up an event with its answers by the message announcing it.
    async fn find_event(&self, guild_id: &str, message_id: &str) -> RollcallResult<Option<Event>>;

    /// All events of a guild with their answers, oldest start first.
    async fn list_events(&self, guild_id: &str) -> RollcallResult<Vec<Event>>;

    async fn find_user(&self, guild_id: &str, member_id: &str) -> RollcallResult<Option<User>>;

    async fn create_user(&self, user: &User) -> RollcallResult<User>;

    async fn update_user_name(&self, user_id: Uuid, display_name: &str) -> RollcallResult<()>;

    async fn list_users(&self, guild_id: &str) -> RollcallResult<Vec<User>>;

    async fn find_answer(&self, event_id: Uuid, user_id: Uuid) -> RollcallResult<Option<Answer>>;

    /// Inserts the answer or overwrites the existing one for the same
    /// (event, user) pair. The returned row keeps the stored id.
    async fn upsert_answer(&self, answer: &Answer) -> RollcallResult<Answer>;

    /// Answers of one event in insertion order.
    async fn list_answers(&self, event_id: Uuid) -> RollcallResult<Vec<Answer>>;
}

/// Outbound actions on the chat platform.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_message(&self, channel_id: &str, text: &str) -> RollcallResult<MessageRef>;

    async fn edit_message(&self, message: &MessageRef, text: &str) -> RollcallResult<()>;

    async fn add_reaction(&self, message: &MessageRef, symbol: &str) -> RollcallResult<()>;

    async fn list_reaction_users(
        &self,
        message: &MessageRef,
        symbol: &str,
    ) -> RollcallResult<Vec<String>>;

    async fn remove_user_reaction(
        &self,
        message: &MessageRef,
        symbol: &str,
        user_id: &str,
    ) -> RollcallResult<()>;

    async fn list_channels(&self, guild_id: &str) -> RollcallResult<Vec<Channel>>;

    async fn create_channel(&self, guild_id: &str, name: &str) -> RollcallResult<Channel>;

    async fn resolve_user(&self, guild_id: &str, user_id: &str) -> RollcallResult<UserProfile>;

    async fn list_members(&self, guild_id: &str) -> RollcallResult<Vec<Member>>;

    async fn is_admin(&self, guild_id: &str, user_id: &str) -> RollcallResult<bool>;
}
