//! Settings database operations
//!
//! Key/value accessors over the settings table.

use sqlx::{Pool, Sqlite};
use setwise_common::{Error, Result};

/// Read and parse a setting; `None` when the key is absent
pub async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
        .map_err(Error::Database)?;

    match row {
        Some((value,)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting {} failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Insert or overwrite a setting
pub async fn set_setting<T>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_test_db;

    #[tokio::test]
    async fn test_get_setting_missing() {
        let pool = setup_test_db().await;
        let value: Option<f64> = get_setting(&pool, "nothing_here").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_setting_upsert() {
        let pool = setup_test_db().await;

        set_setting(&pool, "drop_peak_threshold", 0.6).await.unwrap();
        set_setting(&pool, "drop_peak_threshold", 0.75).await.unwrap();

        let value: Option<f64> = get_setting(&pool, "drop_peak_threshold").await.unwrap();
        assert_eq!(value, Some(0.75));

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM settings WHERE key = 'drop_peak_threshold'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1, "Should have exactly one entry after update");
    }

    #[tokio::test]
    async fn test_get_setting_parse_failure_is_config_error() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO settings (key, value) VALUES ('max_suggestions', 'many')")
            .execute(&pool)
            .await
            .unwrap();

        let result: Result<Option<usize>> = get_setting(&pool, "max_suggestions").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
