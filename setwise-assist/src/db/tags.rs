//! Track tag persistence

use std::collections::HashSet;

use sqlx::{Row, SqlitePool};
use setwise_common::{Error, Result};

use super::{decode_json, decode_timestamp, encode_json};
use crate::models::{TagSet, TaggedTrack};

/// Store tags for a track, replacing any previous tags
pub async fn save_track_tags(
    pool: &SqlitePool,
    track_id: &str,
    tags: TagSet,
    confirmed: bool,
) -> Result<TaggedTrack> {
    let record = TaggedTrack {
        track_id: track_id.to_string(),
        tags,
        confirmed,
        last_updated: setwise_common::time::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO track_tags (track_id, tags, confirmed, last_updated)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(track_id) DO UPDATE SET
            tags = excluded.tags,
            confirmed = excluded.confirmed,
            last_updated = excluded.last_updated
        "#,
    )
    .bind(&record.track_id)
    .bind(encode_json("tags", &record.tags)?)
    .bind(record.confirmed)
    .bind(record.last_updated.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(record)
}

/// Load tags for a track
pub async fn load_track_tags(pool: &SqlitePool, track_id: &str) -> Result<Option<TaggedTrack>> {
    let row = sqlx::query(
        "SELECT track_id, tags, confirmed, last_updated FROM track_tags WHERE track_id = ?",
    )
    .bind(track_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let tags: String = row.get("tags");
            let last_updated: String = row.get("last_updated");
            Ok(Some(TaggedTrack {
                track_id: row.get("track_id"),
                tags: decode_json("tags", &tags)?,
                confirmed: row.get("confirmed"),
                last_updated: decode_timestamp("last_updated", &last_updated)?,
            }))
        }
        None => Ok(None),
    }
}

/// Mark stored tags as confirmed by the user
pub async fn confirm_track_tags(pool: &SqlitePool, track_id: &str) -> Result<TaggedTrack> {
    let now = setwise_common::time::now();
    let result = sqlx::query(
        "UPDATE track_tags SET confirmed = 1, last_updated = ? WHERE track_id = ?",
    )
    .bind(now.to_rfc3339())
    .bind(track_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("No tags stored for track {}", track_id)));
    }

    load_track_tags(pool, track_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No tags stored for track {}", track_id)))
}

/// Filter `track_ids` down to tracks without stored tags, keeping input order
///
/// Unconfirmed tags still count as tagged.
pub async fn untagged_tracks(pool: &SqlitePool, track_ids: &[String]) -> Result<Vec<String>> {
    let stored: Vec<String> = sqlx::query_scalar("SELECT track_id FROM track_tags")
        .fetch_all(pool)
        .await?;
    let tagged: HashSet<String> = stored.into_iter().collect();

    Ok(track_ids
        .iter()
        .filter(|id| !tagged.contains(id.as_str()))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_test_db;
    use crate::services::{infer_tags, TrackMetadata};

    fn sample_tags() -> TagSet {
        infer_tags(&TrackMetadata {
            title: "Midnight Rain",
            genre: Some("Deep House Electronic"),
            bpm: Some(122.0),
        })
    }

    #[tokio::test]
    async fn test_save_load_confirm() {
        let pool = setup_test_db().await;

        let saved = save_track_tags(&pool, "t1", sample_tags(), false).await.unwrap();
        assert!(!saved.confirmed);

        let loaded = load_track_tags(&pool, "t1").await.unwrap().unwrap();
        assert_eq!(loaded.tags, sample_tags());
        assert!(!loaded.confirmed);

        let confirmed = confirm_track_tags(&pool, "t1").await.unwrap();
        assert!(confirmed.confirmed);
        assert_eq!(confirmed.tags, sample_tags());
    }

    #[tokio::test]
    async fn test_confirm_unknown_track() {
        let pool = setup_test_db().await;
        let result = confirm_track_tags(&pool, "ghost").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_untagged_counts_unconfirmed_as_tagged() {
        let pool = setup_test_db().await;
        save_track_tags(&pool, "b", sample_tags(), false).await.unwrap();
        save_track_tags(&pool, "d", sample_tags(), true).await.unwrap();

        let ids: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(untagged_tracks(&pool, &ids).await.unwrap(), vec!["a", "c"]);
    }
}
