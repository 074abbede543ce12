//! Set session state
//!
//! One session tracks what is playing, what has been played and the last
//! batch of suggestions. Sessions are stored whole (last write wins).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use setwise_common::EnergyLevel;

use super::suggestions::{ReferenceTrack, SuggestionHistoryEntry, TrackSuggestion};

/// Maximum history entries kept per session
pub const HISTORY_CAPACITY: usize = 20;

/// Default number of entries returned by the recent-history query
pub const DEFAULT_RECENT_HISTORY: usize = 10;

/// The currently playing track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTrackSnapshot {
    pub track_id: String,
    pub energy: EnergyLevel,
    pub bpm: Option<f64>,
    pub key: Option<String>,
}

/// A played track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetHistoryEntry {
    pub track_id: String,
    pub played_at: DateTime<Utc>,
    pub energy: EnergyLevel,
    pub bpm: Option<f64>,
    pub key: Option<String>,
}

/// Full state of one set session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetState {
    pub session_id: String,
    pub current_track: Option<SetTrackSnapshot>,
    pub history: Vec<SetHistoryEntry>,
    pub suggestions: Vec<TrackSuggestion>,
    pub last_updated: DateTime<Utc>,
}

/// Body for POST /sets/:id/current and POST /sets/:id/history
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTrackRequest {
    pub track_id: String,
    #[serde(default, alias = "energyLevel")]
    pub energy: Option<String>,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub key: Option<String>,
}

impl SetTrackRequest {
    pub fn into_snapshot(self) -> SetTrackSnapshot {
        SetTrackSnapshot {
            energy: EnergyLevel::from_label(self.energy.as_deref()),
            track_id: self.track_id,
            bpm: self.bpm,
            key: self.key,
        }
    }
}

/// Query string for GET /sets/:id/history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SetState {
    pub fn new(session_id: String, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            current_track: None,
            history: Vec::new(),
            suggestions: Vec::new(),
            last_updated: now,
        }
    }

    fn contains(&self, track_id: &str) -> bool {
        self.history.iter().any(|h| h.track_id == track_id)
    }

    /// Record a played track; duplicates are ignored, oldest entries fall off
    ///
    /// Returns false when the track was already in history.
    pub fn add_to_history(&mut self, track: &SetTrackSnapshot, played_at: DateTime<Utc>) -> bool {
        if self.contains(&track.track_id) {
            return false;
        }

        self.history.push(SetHistoryEntry {
            track_id: track.track_id.clone(),
            played_at,
            energy: track.energy,
            bpm: track.bpm,
            key: track.key.clone(),
        });

        if self.history.len() > HISTORY_CAPACITY {
            let excess = self.history.len() - HISTORY_CAPACITY;
            self.history.drain(..excess);
        }
        self.last_updated = played_at;
        true
    }

    /// Make `track` the current track, moving the previous one into history
    pub fn set_current_track(&mut self, track: SetTrackSnapshot, now: DateTime<Utc>) {
        if let Some(previous) = self.current_track.take() {
            if previous.track_id != track.track_id {
                self.add_to_history(&previous, now);
            }
        }
        self.current_track = Some(track);
        self.last_updated = now;
    }

    pub fn replace_suggestions(&mut self, suggestions: Vec<TrackSuggestion>, now: DateTime<Utc>) {
        self.suggestions = suggestions;
        self.last_updated = now;
    }

    /// Last `limit` history entries, oldest first
    pub fn recent_history(&self, limit: usize) -> &[SetHistoryEntry] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }

    /// Current track as a scoring reference
    pub fn reference_track(&self) -> Option<ReferenceTrack> {
        self.current_track.as_ref().map(|current| ReferenceTrack {
            track_id: Some(current.track_id.clone()),
            bpm: current.bpm,
            key: current.key.clone(),
            energy: Some(current.energy.as_str().to_string()),
        })
    }

    /// History in the shape the suggestion engine consumes
    pub fn suggestion_history(&self) -> Vec<SuggestionHistoryEntry> {
        self.history
            .iter()
            .map(|h| SuggestionHistoryEntry {
                track_id: h.track_id.clone(),
                bpm: h.bpm,
                key: h.key.clone(),
                energy: Some(h.energy.as_str().to_string()),
            })
            .collect()
    }

    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|c| c.track_id.as_str())
    }
}
