pub mod repositories;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::domain::repositories::RepositoryError;
use crate::infrastructure::config::AppConfig;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS groups (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        owner_id TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS group_members (
        group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL,
        role TEXT NOT NULL,
        joined_at INTEGER NOT NULL,
        PRIMARY KEY (group_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS games (
        id TEXT PRIMARY KEY,
        group_id TEXT NOT NULL,
        title TEXT NOT NULL,
        scheduled_time INTEGER NOT NULL,
        status TEXT NOT NULL,
        max_participants INTEGER,
        min_participants INTEGER NOT NULL DEFAULT 0,
        current_participants INTEGER NOT NULL DEFAULT 0,
        version INTEGER NOT NULL DEFAULT 0,
        created_by TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_games_group_time ON games (group_id, scheduled_time DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS game_participants (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        game_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        status TEXT NOT NULL,
        joined_at INTEGER NOT NULL,
        registered_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        UNIQUE (game_id, user_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_game_participants_user ON game_participants (user_id, game_id)",
];

/// Open the SQLite pool described by the configuration.
///
/// In-memory databases live inside a single connection, so the pool is pinned
/// to one connection that is never recycled.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool_options = if config.is_in_memory_db() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.db_max_connections)
    };

    pool_options
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Create tables and indexes if they do not exist yet
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Classify sqlx errors into repository errors.
///
/// Lock contention and pool exhaustion are transient and surface as
/// `RepositoryError::Conflict` so the registry write can be retried.
pub fn map_db_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::AlreadyExists(db.message().to_string())
        }
        sqlx::Error::Database(db) => {
            let message = db.message();
            if message.contains("database is locked") || message.contains("busy") {
                RepositoryError::Conflict(message.to_string())
            } else {
                RepositoryError::Database(e.to_string())
            }
        }
        sqlx::Error::PoolTimedOut => RepositoryError::Conflict(e.to_string()),
        _ => RepositoryError::Database(e.to_string()),
    }
}
