//! Cue point persistence
//!
//! One row per track holding its full cue point list as JSON.

use sqlx::{Row, SqlitePool};
use setwise_common::{Error, Result};

use super::{decode_json, decode_timestamp, encode_json};
use crate::models::{CuePoint, TrackCuePoints, UpdateCuePointRequest};

/// Replace all cue points for a track
pub async fn save_track_cue_points(
    pool: &SqlitePool,
    track_id: &str,
    duration: f64,
    cue_points: Vec<CuePoint>,
) -> Result<TrackCuePoints> {
    let record = TrackCuePoints {
        track_id: track_id.to_string(),
        duration,
        cue_points,
        last_updated: setwise_common::time::now(),
    };
    write_record(pool, &record).await?;
    Ok(record)
}

async fn write_record(pool: &SqlitePool, record: &TrackCuePoints) -> Result<()> {
    let cue_points = encode_json("cue_points", &record.cue_points)?;

    sqlx::query(
        r#"
        INSERT INTO track_cue_points (track_id, duration, cue_points, last_updated)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(track_id) DO UPDATE SET
            duration = excluded.duration,
            cue_points = excluded.cue_points,
            last_updated = excluded.last_updated
        "#,
    )
    .bind(&record.track_id)
    .bind(record.duration)
    .bind(cue_points)
    .bind(record.last_updated.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load cue points for a track
pub async fn load_track_cue_points(
    pool: &SqlitePool,
    track_id: &str,
) -> Result<Option<TrackCuePoints>> {
    let row = sqlx::query(
        "SELECT track_id, duration, cue_points, last_updated FROM track_cue_points WHERE track_id = ?",
    )
    .bind(track_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let cue_points: String = row.get("cue_points");
            let last_updated: String = row.get("last_updated");
            Ok(Some(TrackCuePoints {
                track_id: row.get("track_id"),
                duration: row.get("duration"),
                cue_points: decode_json("cue_points", &cue_points)?,
                last_updated: decode_timestamp("last_updated", &last_updated)?,
            }))
        }
        None => Ok(None),
    }
}

async fn require_track(pool: &SqlitePool, track_id: &str) -> Result<TrackCuePoints> {
    load_track_cue_points(pool, track_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No cue points stored for track {}", track_id)))
}

fn check_time(time: f64, duration: f64) -> Result<()> {
    if !time.is_finite() || time < 0.0 || time > duration {
        return Err(Error::InvalidInput(format!(
            "Cue time {} must be between 0 and the track duration {}",
            time, duration
        )));
    }
    Ok(())
}

fn sort_by_time(cue_points: &mut [CuePoint]) {
    cue_points.sort_by(|a, b| a.time.total_cmp(&b.time));
}

/// Append a cue point to a track that already has stored cue points
pub async fn add_cue_point(
    pool: &SqlitePool,
    track_id: &str,
    cue_point: CuePoint,
) -> Result<TrackCuePoints> {
    let mut record = require_track(pool, track_id).await?;
    check_time(cue_point.time, record.duration)?;

    if record.cue_points.iter().any(|c| c.id == cue_point.id) {
        return Err(Error::InvalidInput(format!(
            "Cue point {} already exists on track {}",
            cue_point.id, track_id
        )));
    }

    record.cue_points.push(cue_point);
    sort_by_time(&mut record.cue_points);
    record.last_updated = setwise_common::time::now();
    write_record(pool, &record).await?;
    Ok(record)
}

/// Apply a partial update to one cue point
pub async fn update_cue_point(
    pool: &SqlitePool,
    track_id: &str,
    cue_id: &str,
    update: UpdateCuePointRequest,
) -> Result<TrackCuePoints> {
    let mut record = require_track(pool, track_id).await?;
    let duration = record.duration;

    let cue = record
        .cue_points
        .iter_mut()
        .find(|c| c.id == cue_id)
        .ok_or_else(|| Error::NotFound(format!("Cue point {} not found on track {}", cue_id, track_id)))?;

    if let Some(time) = update.time {
        check_time(time, duration)?;
        cue.time = time;
    }
    if let Some(cue_type) = update.cue_type {
        cue.cue_type = cue_type;
    }
    if let Some(label) = update.label {
        cue.label = Some(label);
    }

    sort_by_time(&mut record.cue_points);
    record.last_updated = setwise_common::time::now();
    write_record(pool, &record).await?;
    Ok(record)
}

/// Remove one cue point
pub async fn delete_cue_point(
    pool: &SqlitePool,
    track_id: &str,
    cue_id: &str,
) -> Result<TrackCuePoints> {
    let mut record = require_track(pool, track_id).await?;

    let before = record.cue_points.len();
    record.cue_points.retain(|c| c.id != cue_id);
    if record.cue_points.len() == before {
        return Err(Error::NotFound(format!(
            "Cue point {} not found on track {}",
            cue_id, track_id
        )));
    }

    record.last_updated = setwise_common::time::now();
    write_record(pool, &record).await?;
    Ok(record)
}

/// Ids of all tracks with stored cue points
pub async fn list_tracks_with_cue_points(pool: &SqlitePool) -> Result<Vec<String>> {
    let ids: Vec<String> =
        sqlx::query_scalar("SELECT track_id FROM track_cue_points ORDER BY track_id")
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_test_db;
    use setwise_common::CueType;

    fn cue(id: &str, cue_type: CueType, time: f64) -> CuePoint {
        CuePoint {
            id: id.to_string(),
            cue_type,
            time,
            label: cue_type.default_label().map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let pool = setup_test_db().await;
        let cues = vec![cue("intro-1", CueType::Intro, 15.0), cue("drop-2", CueType::Drop, 60.0)];

        save_track_cue_points(&pool, "track-1", 240.0, cues.clone()).await.unwrap();
        let loaded = load_track_cue_points(&pool, "track-1").await.unwrap().unwrap();

        assert_eq!(loaded.duration, 240.0);
        assert_eq!(loaded.cue_points, cues);
        assert!(load_track_cue_points(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let pool = setup_test_db().await;
        save_track_cue_points(&pool, "t", 240.0, vec![cue("a", CueType::Intro, 10.0)])
            .await
            .unwrap();
        save_track_cue_points(&pool, "t", 200.0, vec![]).await.unwrap();

        let loaded = load_track_cue_points(&pool, "t").await.unwrap().unwrap();
        assert_eq!(loaded.duration, 200.0);
        assert!(loaded.cue_points.is_empty());
    }

    #[tokio::test]
    async fn test_add_update_delete() {
        let pool = setup_test_db().await;
        save_track_cue_points(&pool, "t", 240.0, vec![cue("drop-1", CueType::Drop, 60.0)])
            .await
            .unwrap();

        let record = add_cue_point(&pool, "t", cue("custom-9", CueType::Custom, 30.0))
            .await
            .unwrap();
        assert_eq!(record.cue_points[0].id, "custom-9", "kept sorted by time");

        let update = UpdateCuePointRequest {
            time: Some(90.0),
            label: Some("Breakdown".to_string()),
            ..Default::default()
        };
        let record = update_cue_point(&pool, "t", "custom-9", update).await.unwrap();
        assert_eq!(record.cue_points[1].id, "custom-9");
        assert_eq!(record.cue_points[1].label.as_deref(), Some("Breakdown"));

        let record = delete_cue_point(&pool, "t", "drop-1").await.unwrap();
        assert_eq!(record.cue_points.len(), 1);

        let stored = load_track_cue_points(&pool, "t").await.unwrap().unwrap();
        assert_eq!(stored.cue_points, record.cue_points);
    }

    #[tokio::test]
    async fn test_unknown_track_or_cue_is_not_found() {
        let pool = setup_test_db().await;
        let result = add_cue_point(&pool, "nope", cue("x", CueType::Custom, 1.0)).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        save_track_cue_points(&pool, "t", 100.0, vec![]).await.unwrap();
        let result = delete_cue_point(&pool, "t", "ghost").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        let result = update_cue_point(&pool, "t", "ghost", UpdateCuePointRequest::default()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_rejects_time_past_duration() {
        let pool = setup_test_db().await;
        save_track_cue_points(&pool, "t", 100.0, vec![]).await.unwrap();
        let result = add_cue_point(&pool, "t", cue("x", CueType::Custom, 101.0)).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_list_tracks() {
        let pool = setup_test_db().await;
        save_track_cue_points(&pool, "b", 100.0, vec![]).await.unwrap();
        save_track_cue_points(&pool, "a", 100.0, vec![]).await.unwrap();
        assert_eq!(list_tracks_with_cue_points(&pool).await.unwrap(), vec!["a", "b"]);
    }
}
