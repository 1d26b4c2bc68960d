use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbAnswer;

/// Inserts an answer, or overwrites `yes_no` and `updated_at` of the row
/// already stored for the same (event, user) pair.
pub async fn upsert_answer(
    pool: &Pool<Postgres>,
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    yes_no: &str,
    updated_at: DateTime<Utc>,
) -> Result<DbAnswer> {
    let now = Utc::now();

    let answer = sqlx::query_as::<_, DbAnswer>(
        r#"
        INSERT INTO answers (id, event_id, user_id, yes_no, updated_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (event_id, user_id)
        DO UPDATE SET yes_no = EXCLUDED.yes_no, updated_at = EXCLUDED.updated_at
        RETURNING id, event_id, user_id, yes_no, updated_at, created_at
        "#,
    )
    .bind(id)
    .bind(event_id)
    .bind(user_id)
    .bind(yes_no)
    .bind(updated_at)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(answer)
}

pub async fn get_answer(
    pool: &Pool<Postgres>,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<Option<DbAnswer>> {
    let answer = sqlx::query_as::<_, DbAnswer>(
        r#"
        SELECT id, event_id, user_id, yes_no, updated_at, created_at
        FROM answers
        WHERE event_id = $1 AND user_id = $2
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(answer)
}

pub async fn get_answers_by_event(pool: &Pool<Postgres>, event_id: Uuid) -> Result<Vec<DbAnswer>> {
    let answers = sqlx::query_as::<_, DbAnswer>(
        r#"
        SELECT id, event_id, user_id, yes_no, updated_at, created_at
        FROM answers
        WHERE event_id = $1
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(answers)
}

/// Answers of several events at once, grouped by the caller.
pub async fn get_answers_by_events(
    pool: &Pool<Postgres>,
    event_ids: &[Uuid],
) -> Result<Vec<DbAnswer>> {
    let answers = sqlx::query_as::<_, DbAnswer>(
        r#"
        SELECT id, event_id, user_id, yes_no, updated_at, created_at
        FROM answers
        WHERE event_id = ANY($1)
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(event_ids)
    .fetch_all(pool)
    .await?;

    Ok(answers)
}
