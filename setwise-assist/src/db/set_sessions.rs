//! Set session persistence
//!
//! A session is stored as one JSON document; every mutation loads it,
//! changes it in memory and writes it back whole.

use sqlx::{Row, SqlitePool};
use setwise_common::{Error, Result};
use uuid::Uuid;

use super::{decode_json, encode_json};
use crate::models::SetState;

/// Create an empty session with a fresh id
pub async fn create_session(pool: &SqlitePool) -> Result<SetState> {
    let state = SetState::new(Uuid::new_v4().to_string(), setwise_common::time::now());
    save_session(pool, &state).await?;
    tracing::info!(session_id = %state.session_id, "Created set session");
    Ok(state)
}

/// Write a session (last write wins)
pub async fn save_session(pool: &SqlitePool, state: &SetState) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO set_sessions (session_id, state, last_updated)
        VALUES (?, ?, ?)
        ON CONFLICT(session_id) DO UPDATE SET
            state = excluded.state,
            last_updated = excluded.last_updated
        "#,
    )
    .bind(&state.session_id)
    .bind(encode_json("state", state)?)
    .bind(state.last_updated.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a session
pub async fn load_session(pool: &SqlitePool, session_id: &str) -> Result<Option<SetState>> {
    let row = sqlx::query("SELECT state FROM set_sessions WHERE session_id = ?")
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let state: String = row.get("state");
            Ok(Some(decode_json("state", &state)?))
        }
        None => Ok(None),
    }
}

/// Load a session or fail with NotFound
pub async fn require_session(pool: &SqlitePool, session_id: &str) -> Result<SetState> {
    load_session(pool, session_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Set session {} not found", session_id)))
}

/// Delete a session; NotFound if it did not exist
pub async fn delete_session(pool: &SqlitePool, session_id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM set_sessions WHERE session_id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Set session {} not found", session_id)));
    }
    Ok(())
}
