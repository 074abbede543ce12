//! Database access for setwise-assist
//!
//! SQLite holds tuned parameters and everything users save from the
//! analysis results. Each record is written whole; the last write wins.

pub mod cue_points;
pub mod parameters;
pub mod set_sessions;
pub mod settings;
pub mod tags;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create setwise-assist tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_cue_points (
            track_id TEXT PRIMARY KEY,
            duration REAL NOT NULL,
            cue_points TEXT NOT NULL DEFAULT '[]',
            last_updated TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_tags (
            track_id TEXT PRIMARY KEY,
            tags TEXT NOT NULL,
            confirmed INTEGER NOT NULL DEFAULT 0,
            last_updated TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS set_sessions (
            session_id TEXT PRIMARY KEY,
            state TEXT NOT NULL,
            last_updated TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (settings, track_cue_points, track_tags, set_sessions)");

    Ok(())
}

/// Decode a JSON column, reporting the column name on failure
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    column: &str,
    raw: &str,
) -> setwise_common::Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        setwise_common::Error::Internal(format!("Failed to deserialize {}: {}", column, e))
    })
}

/// Encode a value for a JSON column
pub(crate) fn encode_json<T: serde::Serialize>(
    column: &str,
    value: &T,
) -> setwise_common::Result<String> {
    serde_json::to_string(value).map_err(|e| {
        setwise_common::Error::Internal(format!("Failed to serialize {}: {}", column, e))
    })
}

/// Parse a stored RFC 3339 timestamp
pub(crate) fn decode_timestamp(
    column: &str,
    raw: &str,
) -> setwise_common::Result<chrono::DateTime<chrono::Utc>> {
    setwise_common::time::parse_rfc3339(raw).ok_or_else(|| {
        setwise_common::Error::Internal(format!("Failed to parse {}: {}", column, raw))
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_database_pool_creates_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("setwise.db");

        let pool = init_database_pool(&db_path).await.unwrap();
        assert!(db_path.exists());

        // Re-running the schema is harmless
        init_tables(&pool).await.unwrap();

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(tables, vec!["set_sessions", "settings", "track_cue_points", "track_tags"]);
    }
}
