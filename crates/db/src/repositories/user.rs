use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::models::DbUser;

pub async fn create_user(
    pool: &Pool<Postgres>,
    id: Uuid,
    guild_id: &str,
    member_id: &str,
    display_name: &str,
) -> Result<DbUser> {
    let now = Utc::now();

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, guild_id, member_id, display_name, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, guild_id, member_id, display_name, created_at
        "#,
    )
    .bind(id)
    .bind(guild_id)
    .bind(member_id)
    .bind(display_name)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_member(
    pool: &Pool<Postgres>,
    guild_id: &str,
    member_id: &str,
) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, guild_id, member_id, display_name, created_at
        FROM users
        WHERE guild_id = $1 AND member_id = $2
        "#,
    )
    .bind(guild_id)
    .bind(member_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_users_by_guild(pool: &Pool<Postgres>, guild_id: &str) -> Result<Vec<DbUser>> {
    let users = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, guild_id, member_id, display_name, created_at
        FROM users
        WHERE guild_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(guild_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Returns `false` when no user has the given id.
pub async fn update_display_name(pool: &Pool<Postgres>, id: Uuid, display_name: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET display_name = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(display_name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
