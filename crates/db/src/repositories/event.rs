use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbEvent;

pub struct NewEvent<'a> {
    pub id: Uuid,
    pub guild_id: &'a str,
    pub channel_id: &'a str,
    pub message_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub location: &'a str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

pub async fn create_event(pool: &Pool<Postgres>, event: NewEvent<'_>) -> Result<DbEvent> {
    let now = Utc::now();

    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        INSERT INTO events (id, guild_id, channel_id, message_id, name, description, location, start_time, end_time, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, guild_id, channel_id, message_id, name, description, location, start_time, end_time, created_at
        "#,
    )
    .bind(event.id)
    .bind(event.guild_id)
    .bind(event.channel_id)
    .bind(event.message_id)
    .bind(event.name)
    .bind(event.description)
    .bind(event.location)
    .bind(event.start_time)
    .bind(event.end_time)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(event)
}

pub async fn get_event_by_message(
    pool: &Pool<Postgres>,
    guild_id: &str,
    message_id: &str,
) -> Result<Option<DbEvent>> {
    let event = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, guild_id, channel_id, message_id, name, description, location, start_time, end_time, created_at
        FROM events
        WHERE guild_id = $1 AND message_id = $2
        "#,
    )
    .bind(guild_id)
    .bind(message_id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

pub async fn get_events_by_guild(pool: &Pool<Postgres>, guild_id: &str) -> Result<Vec<DbEvent>> {
    let events = sqlx::query_as::<_, DbEvent>(
        r#"
        SELECT id, guild_id, channel_id, message_id, name, description, location, start_time, end_time, created_at
        FROM events
        WHERE guild_id = $1
        ORDER BY start_time ASC, created_at ASC
        "#,
    )
    .bind(guild_id)
    .fetch_all(pool)
    .await?;

    Ok(events)
}
