use chrono::{DateTime, Utc};
use rollcall_core::errors::{RollcallError, RollcallResult};
use rollcall_core::models::{Answer, Event, Metadata, User};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMetadata {
    pub id: Uuid,
    pub guild_id: String,
    pub last_week_reset: Option<DateTime<Utc>>,
    pub channel_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub guild_id: String,
    pub member_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbEvent {
    pub id: Uuid,
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAnswer {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    /// One of `yes`, `no`, `maybe`.
    pub yes_no: String,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<DbMetadata> for Metadata {
    fn from(row: DbMetadata) -> Self {
        Metadata {
            guild_id: row.guild_id,
            last_week_reset: row.last_week_reset,
            channel_name: row.channel_name,
        }
    }
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            guild_id: row.guild_id,
            member_id: row.member_id,
            display_name: row.display_name,
        }
    }
}

impl DbEvent {
    pub fn into_event(self, answers: Vec<Answer>) -> Event {
        Event {
            id: self.id,
            guild_id: self.guild_id,
            channel_id: self.channel_id,
            message_id: self.message_id,
            name: self.name,
            description: self.description,
            location: self.location,
            start_time: self.start_time,
            end_time: self.end_time,
            answers,
        }
    }
}

impl TryFrom<DbAnswer> for Answer {
    type Error = RollcallError;

    fn try_from(row: DbAnswer) -> RollcallResult<Self> {
        Ok(Answer {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            yes_no: row.yes_no.parse()?,
            updated_at: row.updated_at,
        })
    }
}
