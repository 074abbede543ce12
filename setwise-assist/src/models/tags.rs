//! Tag inference data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use setwise_common::{EnergyLevel, VocalType};

/// Descriptive tags for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSet {
    pub energy: EnergyLevel,
    pub mood: String,
    /// At most three entries
    pub instrumentation: Vec<String>,
    pub vocal_type: VocalType,
    /// Always null from inference; may be set by a user
    pub era: Option<String>,
}

/// POST /tags/suggest request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSuggestionRequest {
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// POST /tags/suggest response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSuggestionResponse {
    pub success: bool,
    pub track_id: String,
    pub suggestions: TagSet,
}

/// Stored tags for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedTrack {
    pub track_id: String,
    pub tags: TagSet,
    pub confirmed: bool,
    pub last_updated: DateTime<Utc>,
}

/// PUT /tracks/:track_id/tags
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTagsRequest {
    pub tags: TagSet,
    #[serde(default)]
    pub confirmed: bool,
}

/// POST /tags/untagged request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntaggedTracksRequest {
    pub track_ids: Vec<String>,
}

/// POST /tags/untagged response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UntaggedTracksResponse {
    pub untagged: Vec<String>,
}
