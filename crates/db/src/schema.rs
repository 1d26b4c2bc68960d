use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

const STATEMENTS: &[&str] = &[
    // One row per guild
    r#"
    CREATE TABLE IF NOT EXISTS metadata (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        guild_id VARCHAR(255) NOT NULL UNIQUE,
        last_week_reset TIMESTAMP WITH TIME ZONE NULL,
        channel_name VARCHAR(255) NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        guild_id VARCHAR(255) NOT NULL,
        member_id VARCHAR(255) NOT NULL,
        display_name VARCHAR(255) NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT users_guild_member_key UNIQUE (guild_id, member_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        guild_id VARCHAR(255) NOT NULL,
        channel_id VARCHAR(255) NOT NULL,
        message_id VARCHAR(255) NOT NULL,
        name VARCHAR(255) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        location TEXT NOT NULL DEFAULT '',
        start_time TIMESTAMP WITH TIME ZONE NOT NULL,
        end_time TIMESTAMP WITH TIME ZONE NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT events_guild_message_key UNIQUE (guild_id, message_id),
        CONSTRAINT valid_time_range CHECK (end_time > start_time)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS answers (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        yes_no VARCHAR(8) NOT NULL CHECK (yes_no IN ('yes', 'no', 'maybe')),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        CONSTRAINT answers_event_user_key UNIQUE (event_id, user_id)
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_events_guild_start ON events(guild_id, start_time);",
    "CREATE INDEX IF NOT EXISTS idx_answers_event_id ON answers(event_id);",
    "CREATE INDEX IF NOT EXISTS idx_users_guild_id ON users(guild_id);",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
