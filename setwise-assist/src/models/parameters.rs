//! Tunable heuristic parameters
//!
//! Defaults reproduce the fixed thresholds of the detection and suggestion
//! heuristics; an install that never touches /parameters/global behaves
//! exactly as documented.

use serde::{Deserialize, Serialize};

/// Cue point detection thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueDetectionParameters {
    /// Normalized energy an intro must exceed (default: 0.3)
    #[serde(default = "default_intro_energy_threshold")]
    pub intro_energy_threshold: f64,

    /// Fraction of the curve scanned for the intro (default: 0.3)
    #[serde(default = "default_intro_scan_fraction")]
    pub intro_scan_fraction: f64,

    /// Hard cap on scanned intro segments (default: 30)
    #[serde(default = "default_intro_scan_max_segments")]
    pub intro_scan_max_segments: usize,

    /// Peak energy required to accept a drop (default: 0.6)
    #[serde(default = "default_drop_peak_threshold")]
    pub drop_peak_threshold: f64,

    /// End of the drop search window as a fraction of the curve (default: 0.7)
    #[serde(default = "default_drop_search_end_fraction")]
    pub drop_search_end_fraction: f64,

    /// Where the outro scan begins as a fraction of the curve (default: 0.8)
    #[serde(default = "default_outro_start_fraction")]
    pub outro_start_fraction: f64,

    /// Outro begins below this ratio of the pre-outro average (default: 0.5)
    #[serde(default = "default_outro_drop_ratio")]
    pub outro_drop_ratio: f64,
}

/// Set suggestion limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionParameters {
    /// Suggestions returned per request (default: 5)
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// History entries whose artists are penalized (default: 5)
    #[serde(default = "default_recent_artist_window")]
    pub recent_artist_window: usize,
}

/// All parameters stored in the settings table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistParameters {
    #[serde(default)]
    pub cue_detection: CueDetectionParameters,
    #[serde(default)]
    pub suggestions: SuggestionParameters,
}

fn default_intro_energy_threshold() -> f64 {
    0.3
}

fn default_intro_scan_fraction() -> f64 {
    0.3
}

fn default_intro_scan_max_segments() -> usize {
    30
}

fn default_drop_peak_threshold() -> f64 {
    0.6
}

fn default_drop_search_end_fraction() -> f64 {
    0.7
}

fn default_outro_start_fraction() -> f64 {
    0.8
}

fn default_outro_drop_ratio() -> f64 {
    0.5
}

fn default_max_suggestions() -> usize {
    5
}

fn default_recent_artist_window() -> usize {
    5
}

impl Default for CueDetectionParameters {
    fn default() -> Self {
        Self {
            intro_energy_threshold: default_intro_energy_threshold(),
            intro_scan_fraction: default_intro_scan_fraction(),
            intro_scan_max_segments: default_intro_scan_max_segments(),
            drop_peak_threshold: default_drop_peak_threshold(),
            drop_search_end_fraction: default_drop_search_end_fraction(),
            outro_start_fraction: default_outro_start_fraction(),
            outro_drop_ratio: default_outro_drop_ratio(),
        }
    }
}

impl Default for SuggestionParameters {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
            recent_artist_window: default_recent_artist_window(),
        }
    }
}

impl CueDetectionParameters {
    /// Reject values that would make the detector meaningless
    pub fn validate(&self) -> Result<(), String> {
        let fractions = [
            ("intro_energy_threshold", self.intro_energy_threshold),
            ("intro_scan_fraction", self.intro_scan_fraction),
            ("drop_peak_threshold", self.drop_peak_threshold),
            ("drop_search_end_fraction", self.drop_search_end_fraction),
            ("outro_start_fraction", self.outro_start_fraction),
            ("outro_drop_ratio", self.outro_drop_ratio),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0, got {}", name, value));
            }
        }
        Ok(())
    }
}

impl SuggestionParameters {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_suggestions == 0 {
            return Err("max_suggestions must be at least 1".to_string());
        }
        Ok(())
    }
}

impl AssistParameters {
    pub fn validate(&self) -> Result<(), String> {
        self.cue_detection.validate()?;
        self.suggestions.validate()
    }
}
