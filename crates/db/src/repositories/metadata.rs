use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbMetadata;

pub async fn create_metadata(
    pool: &Pool<Postgres>,
    guild_id: &str,
    last_week_reset: Option<DateTime<Utc>>,
    channel_name: &str,
) -> Result<DbMetadata> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let metadata = sqlx::query_as::<_, DbMetadata>(
        r#"
        INSERT INTO metadata (id, guild_id, last_week_reset, channel_name, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, guild_id, last_week_reset, channel_name, created_at
        "#,
    )
    .bind(id)
    .bind(guild_id)
    .bind(last_week_reset)
    .bind(channel_name)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(metadata)
}

pub async fn get_metadata_by_guild(
    pool: &Pool<Postgres>,
    guild_id: &str,
) -> Result<Option<DbMetadata>> {
    let metadata = sqlx::query_as::<_, DbMetadata>(
        r#"
        SELECT id, guild_id, last_week_reset, channel_name, created_at
        FROM metadata
        WHERE guild_id = $1
        "#,
    )
    .bind(guild_id)
    .fetch_optional(pool)
    .await?;

    Ok(metadata)
}

pub async fn get_all_metadata(pool: &Pool<Postgres>) -> Result<Vec<DbMetadata>> {
    let metadata = sqlx::query_as::<_, DbMetadata>(
        r#"
        SELECT id, guild_id, last_week_reset, channel_name, created_at
        FROM metadata
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(metadata)
}

/// Conditional write of `last_week_reset`. Returns whether a row changed.
pub async fn update_last_week_reset(
    pool: &Pool<Postgres>,
    guild_id: &str,
    previous: Option<DateTime<Utc>>,
    next: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE metadata
        SET last_week_reset = $3
        WHERE guild_id = $1 AND last_week_reset IS NOT DISTINCT FROM $2
        "#,
    )
    .bind(guild_id)
    .bind(previous)
    .bind(next)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
