//! PostgreSQL-backed [`RecordStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rollcall_core::errors::{RollcallError, RollcallResult};
use rollcall_core::models::{Answer, Event, Metadata, User};
use rollcall_core::ports::RecordStore;
use tracing::debug;
use uuid::Uuid;

use crate::DbPool;
use crate::models::{DbAnswer, DbEvent};
use crate::repositories::event::NewEvent;
use crate::repositories::{answer, event, metadata, user};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn attach_answers(&self, rows: Vec<DbEvent>) -> RollcallResult<Vec<Event>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut by_event: HashMap<Uuid, Vec<Answer>> = HashMap::new();
        for row in answer::get_answers_by_events(&self.pool, &ids).await? {
            let answer = Answer::try_from(row)?;
            by_event.entry(answer.event_id).or_default().push(answer);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let answers = by_event.remove(&row.id).unwrap_or_default();
                row.into_event(answers)
            })
            .collect())
    }
}

/// Unique-key violations become [`RollcallError::Conflict`] so callers can
/// re-read the row a concurrent writer created. A dangling reference is
/// reported as [`RollcallError::NotFound`].
fn map_write_error(report: eyre::Report, what: &str) -> RollcallError {
    let (unique, dangling) = match report
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
    {
        Some(e) => (e.is_unique_violation(), e.is_foreign_key_violation()),
        None => (false, false),
    };

    if unique {
        debug!("{} already exists", what);
        RollcallError::Conflict(what.to_string())
    } else if dangling {
        RollcallError::NotFound(format!("referenced row of {}", what))
    } else {
        RollcallError::Database(report)
    }
}

fn answers(rows: Vec<DbAnswer>) -> RollcallResult<Vec<Answer>> {
    rows.into_iter().map(Answer::try_from).collect()
}

#[async_trait]
impl RecordStore for PgStore {
    async fn find_metadata(&self, guild_id: &str) -> RollcallResult<Option<Metadata>> {
        let row = metadata::get_metadata_by_guild(&self.pool, guild_id).await?;
        Ok(row.map(Metadata::from))
    }

    async fn create_metadata(&self, new: &Metadata) -> RollcallResult<Metadata> {
        let row = metadata::create_metadata(
            &self.pool,
            &new.guild_id,
            new.last_week_reset,
            &new.channel_name,
        )
        .await
        .map_err(|e| map_write_error(e, &format!("metadata for guild {}", new.guild_id)))?;
        Ok(row.into())
    }

    async fn list_metadata(&self) -> RollcallResult<Vec<Metadata>> {
        let rows = metadata::get_all_metadata(&self.pool).await?;
        Ok(rows.into_iter().map(Metadata::from).collect())
    }

    async fn update_last_week_reset(
        &self,
        guild_id: &str,
        previous: Option<DateTime<Utc>>,
        next: DateTime<Utc>,
    ) -> RollcallResult<bool> {
        let updated = metadata::update_last_week_reset(&self.pool, guild_id, previous, next).await?;
        if !updated && metadata::get_metadata_by_guild(&self.pool, guild_id).await?.is_none() {
            return Err(RollcallError::NotFound(format!("metadata for guild {}", guild_id)));
        }
        Ok(updated)
    }

    async fn create_event(&self, new: &Event) -> RollcallResult<Event> {
        let row = event::create_event(
            &self.pool,
            NewEvent {
                id: new.id,
                guild_id: &new.guild_id,
                channel_id: &new.channel_id,
                message_id: &new.message_id,
                name: &new.name,
                description: &new.description,
                location: &new.location,
                start_time: new.start_time,
                end_time: new.end_time,
            },
        )
        .await
        .map_err(|e| map_write_error(e, &format!("event for message {}", new.message_id)))?;
        Ok(row.into_event(Vec::new()))
    }

    async fn find_event(&self, guild_id: &str, message_id: &str) -> RollcallResult<Option<Event>> {
        let Some(row) = event::get_event_by_message(&self.pool, guild_id, message_id).await? else {
            return Ok(None);
        };
        let answers = answers(answer::get_answers_by_event(&self.pool, row.id).await?)?;
        Ok(Some(row.into_event(answers)))
    }

    async fn list_events(&self, guild_id: &str) -> RollcallResult<Vec<Event>> {
        let rows = event::get_events_by_guild(&self.pool, guild_id).await?;
        self.attach_answers(rows).await
    }

    async fn find_user(&self, guild_id: &str, member_id: &str) -> RollcallResult<Option<User>> {
        let row = user::get_user_by_member(&self.pool, guild_id, member_id).await?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, new: &User) -> RollcallResult<User> {
        let row = user::create_user(
            &self.pool,
            new.id,
            &new.guild_id,
            &new.member_id,
            &new.display_name,
        )
        .await
        .map_err(|e| map_write_error(e, &format!("user {} in guild {}", new.member_id, new.guild_id)))?;
        Ok(row.into())
    }

    async fn update_user_name(&self, user_id: Uuid, display_name: &str) -> RollcallResult<()> {
        if !user::update_display_name(&self.pool, user_id, display_name).await? {
            return Err(RollcallError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    async fn list_users(&self, guild_id: &str) -> RollcallResult<Vec<User>> {
        let rows = user::get_users_by_guild(&self.pool, guild_id).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_answer(&self, event_id: Uuid, user_id: Uuid) -> RollcallResult<Option<Answer>> {
        answer::get_answer(&self.pool, event_id, user_id)
            .await?
            .map(Answer::try_from)
            .transpose()
    }

    async fn upsert_answer(&self, new: &Answer) -> RollcallResult<Answer> {
        let row = answer::upsert_answer(
            &self.pool,
            new.id,
            new.event_id,
            new.user_id,
            new.yes_no.as_str(),
            new.updated_at,
        )
        .await
        .map_err(|e| map_write_error(e, &format!("answer for event {}", new.event_id)))?;
        Answer::try_from(row)
    }

    async fn list_answers(&self, event_id: Uuid) -> RollcallResult<Vec<Answer>> {
        answers(answer::get_answers_by_event(&self.pool, event_id).await?)
    }
}
