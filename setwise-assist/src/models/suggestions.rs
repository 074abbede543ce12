//! Set suggestion data structures

use serde::{Deserialize, Serialize};
use setwise_common::{EnergyLevel, TransitionType};

/// Minimal projection of a library track used for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSignature {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// The track currently playing, used as the scoring reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTrack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub key: Option<String>,
    /// Free-form label; anything but low/medium/high counts as medium
    #[serde(default, alias = "energyLevel")]
    pub energy: Option<String>,
}

impl ReferenceTrack {
    pub fn energy_level(&self) -> EnergyLevel {
        EnergyLevel::from_label(self.energy.as_deref())
    }
}

/// A previously played track in the current set, most recent last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionHistoryEntry {
    pub track_id: String,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, alias = "energyLevel")]
    pub energy: Option<String>,
}

/// A ranked next-track recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSuggestion {
    pub track_id: String,
    pub title: String,
    pub artist: Option<String>,
    pub bpm: Option<f64>,
    pub key: Option<String>,
    pub energy: EnergyLevel,
    /// Suggested cue-in offset in seconds
    pub cue_point: u32,
    pub transition_type: TransitionType,
    pub confidence: f64,
}

/// POST /set/suggest request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSuggestionRequest {
    #[serde(default)]
    pub current_track: Option<ReferenceTrack>,
    #[serde(default)]
    pub history: Option<Vec<SuggestionHistoryEntry>>,
    #[serde(default)]
    pub all_tracks: Option<Vec<TrackSignature>>,
    /// Pull missing context from, and store results into, a set session
    #[serde(default)]
    pub session_id: Option<String>,
}

/// POST /set/suggest response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSuggestionResponse {
    pub success: bool,
    pub suggestions: Vec<TrackSuggestion>,
}
