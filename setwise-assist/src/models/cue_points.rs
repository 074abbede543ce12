//! Cue point data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use setwise_common::CueType;

/// A labeled timestamp inside a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuePoint {
    pub id: String,
    #[serde(rename = "type")]
    pub cue_type: CueType,
    /// Seconds from the start of the track
    pub time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Waveform payload, accepted either bare or wrapped in an object
///
/// Anything else is kept as `Unusable` so analysis can fall back to tempo
/// and duration estimates instead of rejecting the request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WaveformInput {
    Samples(Vec<f64>),
    Wrapped {
        #[serde(default)]
        waveform: Option<Vec<f64>>,
    },
    Unusable(serde_json::Value),
}

impl Default for WaveformInput {
    fn default() -> Self {
        WaveformInput::Samples(Vec::new())
    }
}

impl WaveformInput {
    pub fn is_unusable(&self) -> bool {
        matches!(self, WaveformInput::Unusable(_))
    }

    pub fn into_samples(self) -> Vec<f64> {
        match self {
            WaveformInput::Samples(samples) => samples,
            WaveformInput::Wrapped { waveform } => waveform.unwrap_or_default(),
            WaveformInput::Unusable(_) => Vec::new(),
        }
    }
}

/// Cue point analysis request (POST /cue-points/analyze)
///
/// Required fields are optional here so that a missing field is reported
/// as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuePointAnalysisRequest {
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub bpm: Option<f64>,
    #[serde(default)]
    pub waveform: Option<WaveformInput>,
}

/// Cue point analysis response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuePointAnalysisResponse {
    pub success: bool,
    pub track_id: String,
    pub cue_points: Vec<CuePoint>,
}

/// Stored cue points for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCuePoints {
    pub track_id: String,
    /// Track duration in seconds
    pub duration: f64,
    pub cue_points: Vec<CuePoint>,
    pub last_updated: DateTime<Utc>,
}

/// PUT /tracks/:track_id/cue-points
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCuePointsRequest {
    pub duration: f64,
    #[serde(default)]
    pub cue_points: Vec<CuePoint>,
}

/// POST /tracks/:track_id/cue-points
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCuePointRequest {
    /// Generated when omitted
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub cue_type: CueType,
    pub time: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// PATCH /tracks/:track_id/cue-points/:cue_id (partial update)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCuePointRequest {
    #[serde(default, rename = "type")]
    pub cue_type: Option<CueType>,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_accepts_bare_array() {
        let input: WaveformInput = serde_json::from_str("[0.1, -0.5, 1]").unwrap();
        assert_eq!(input.into_samples(), vec![0.1, -0.5, 1.0]);
    }

    #[test]
    fn test_waveform_accepts_wrapped_object() {
        let input: WaveformInput = serde_json::from_str(r#"{"waveform": [0.25, 0.5]}"#).unwrap();
        assert_eq!(input.into_samples(), vec![0.25, 0.5]);

        let empty: WaveformInput = serde_json::from_str("{}").unwrap();
        assert!(empty.into_samples().is_empty());
    }

    #[test]
    fn test_waveform_of_wrong_shape_yields_no_samples() {
        for raw in [r#""abc""#, r#"{"waveform": "abc"}"#, r#"[1, "two"]"#, "42"] {
            let input: WaveformInput = serde_json::from_str(raw).unwrap();
            assert!(input.is_unusable(), "input: {}", raw);
            assert!(input.into_samples().is_empty());
        }

        let wrapped: WaveformInput = serde_json::from_str(r#"{"waveform": [0.5]}"#).unwrap();
        assert!(!wrapped.is_unusable());
    }

    #[test]
    fn test_cue_point_wire_format() {
        let cue = CuePoint {
            id: "drop-1".to_string(),
            cue_type: CueType::Drop,
            time: 60.0,
            label: None,
        };
        let json = serde_json::to_value(&cue).unwrap();
        assert_eq!(json["type"], "drop");
        assert_eq!(json["time"], 60.0);
        assert!(json.get("label").is_none());
    }
}
