//! Music vocabulary shared by the analysis engines
//!
//! Energy levels, cue and transition kinds, key-root parsing and the
//! circle-of-fifths distance used for harmonic compatibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// BPM below this is `low` energy
pub const LOW_ENERGY_BPM_CEILING: f64 = 100.0;

/// BPM below this (and at least [`LOW_ENERGY_BPM_CEILING`]) is `medium` energy
pub const MEDIUM_ENERGY_BPM_CEILING: f64 = 130.0;

/// Pitch classes ordered around the circle of fifths
pub const CIRCLE_OF_FIFTHS: [&str; 12] = [
    "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#", "F",
];

/// Pitch class names indexed by semitone above C (sharps only)
const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Treat zero, negative and non-finite BPM values as absent
pub fn usable_bpm(bpm: Option<f64>) -> Option<f64> {
    bpm.filter(|b| b.is_finite() && *b > 0.0)
}

/// Coarse energy classification of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl EnergyLevel {
    /// Classify by tempo; missing BPM is `medium`
    pub fn from_bpm(bpm: Option<f64>) -> Self {
        match usable_bpm(bpm) {
            Some(b) if b < LOW_ENERGY_BPM_CEILING => EnergyLevel::Low,
            Some(b) if b < MEDIUM_ENERGY_BPM_CEILING => EnergyLevel::Medium,
            Some(_) => EnergyLevel::High,
            None => EnergyLevel::Medium,
        }
    }

    /// Position on the low=1, medium=2, high=3 scale
    pub fn ordinal(self) -> i32 {
        match self {
            EnergyLevel::Low => 1,
            EnergyLevel::Medium => 2,
            EnergyLevel::High => 3,
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(EnergyLevel::Low),
            "medium" => Some(EnergyLevel::Medium),
            "high" => Some(EnergyLevel::High),
            _ => None,
        }
    }

    /// Parse, mapping unknown or missing labels to `medium`
    pub fn from_label(label: Option<&str>) -> Self {
        label.and_then(Self::from_str).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of cue point marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueType {
    Intro,
    Drop,
    Outro,
    Custom,
}

impl CueType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "intro" => Some(CueType::Intro),
            "drop" => Some(CueType::Drop),
            "outro" => Some(CueType::Outro),
            "custom" => Some(CueType::Custom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CueType::Intro => "intro",
            CueType::Drop => "drop",
            CueType::Outro => "outro",
            CueType::Custom => "custom",
        }
    }

    /// Label attached to detected cues
    pub fn default_label(&self) -> Option<&'static str> {
        match self {
            CueType::Intro => Some("Intro End"),
            CueType::Drop => Some("Drop"),
            CueType::Outro => Some("Outro Start"),
            CueType::Custom => None,
        }
    }
}

impl fmt::Display for CueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested mixing technique between two tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    Beatmatch,
    #[default]
    Fade,
    Cut,
}

impl TransitionType {
    /// Pick a transition from the absolute tempo difference
    ///
    /// `None` (either tempo unknown) yields `fade`.
    pub fn from_bpm_delta(delta: Option<f64>) -> Self {
        match delta.map(f64::abs) {
            Some(d) if d <= 2.0 => TransitionType::Beatmatch,
            Some(d) if d <= 5.0 => TransitionType::Fade,
            Some(_) => TransitionType::Cut,
            None => TransitionType::Fade,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionType::Beatmatch => "beatmatch",
            TransitionType::Fade => "fade",
            TransitionType::Cut => "cut",
        }
    }
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vocal presence tag
///
/// `Mixed` is a valid value that no inference rule currently produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocalType {
    Vocal,
    Instrumental,
    Mixed,
}

impl VocalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VocalType::Vocal => "vocal",
            VocalType::Instrumental => "instrumental",
            VocalType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for VocalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root pitch class of a key string, spelled with sharps
///
/// Uses the first whitespace-separated token and keeps only the note letter
/// and an optional accidental, so "Am", "A minor" and "A" all give "A".
/// Flats are respelled as sharps ("Bb minor" gives "A#").
pub fn key_root(key: &str) -> Option<&'static str> {
    let token = key.split_whitespace().next()?;
    let mut chars = token.chars();

    let semitone: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let shift = match chars.next() {
        Some('#') | Some('♯') => 1,
        Some('b') | Some('♭') => -1,
        _ => 0,
    };

    let pitch_class = (semitone + shift).rem_euclid(12) as usize;
    Some(PITCH_CLASS_NAMES[pitch_class])
}

/// Position of a key's root on [`CIRCLE_OF_FIFTHS`]
pub fn circle_of_fifths_index(key: &str) -> Option<usize> {
    let root = key_root(key)?;
    CIRCLE_OF_FIFTHS.iter().position(|k| *k == root)
}

/// Steps between two keys around the circle of fifths (0..=6)
pub fn circle_distance(a: &str, b: &str) -> Option<usize> {
    let i = circle_of_fifths_index(a)?;
    let j = circle_of_fifths_index(b)?;
    let diff = i.abs_diff(j);
    Some(diff.min(12 - diff))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_from_bpm_thresholds() {
        assert_eq!(EnergyLevel::from_bpm(Some(99.9)), EnergyLevel::Low);
        assert_eq!(EnergyLevel::from_bpm(Some(100.0)), EnergyLevel::Medium);
        assert_eq!(EnergyLevel::from_bpm(Some(129.9)), EnergyLevel::Medium);
        assert_eq!(EnergyLevel::from_bpm(Some(130.0)), EnergyLevel::High);
        assert_eq!(EnergyLevel::from_bpm(None), EnergyLevel::Medium);
        assert_eq!(EnergyLevel::from_bpm(Some(0.0)), EnergyLevel::Medium);
    }

    #[test]
    fn test_energy_label_parsing() {
        assert_eq!(EnergyLevel::from_str("HIGH"), Some(EnergyLevel::High));
        assert_eq!(EnergyLevel::from_str("loud"), None);
        assert_eq!(EnergyLevel::from_label(Some("loud")), EnergyLevel::Medium);
        assert_eq!(EnergyLevel::from_label(None), EnergyLevel::Medium);
    }

    #[test]
    fn test_energy_serde_lowercase() {
        let json = serde_json::to_string(&EnergyLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
        let parsed: EnergyLevel = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(parsed, EnergyLevel::Low);
    }

    #[test]
    fn test_transition_from_bpm_delta() {
        assert_eq!(TransitionType::from_bpm_delta(Some(2.0)), TransitionType::Beatmatch);
        assert_eq!(TransitionType::from_bpm_delta(Some(-2.0)), TransitionType::Beatmatch);
        assert_eq!(TransitionType::from_bpm_delta(Some(5.0)), TransitionType::Fade);
        assert_eq!(TransitionType::from_bpm_delta(Some(5.5)), TransitionType::Cut);
        assert_eq!(TransitionType::from_bpm_delta(None), TransitionType::Fade);
    }

    #[test]
    fn test_key_root_variants() {
        assert_eq!(key_root("Am"), Some("A"));
        assert_eq!(key_root("A minor"), Some("A"));
        assert_eq!(key_root("A"), Some("A"));
        assert_eq!(key_root("F#m"), Some("F#"));
        assert_eq!(key_root("Bb major"), Some("A#"));
        assert_eq!(key_root("Db"), Some("C#"));
        assert_eq!(key_root("Bm"), Some("B"));
        assert_eq!(key_root("8A"), None);
        assert_eq!(key_root(""), None);
    }

    #[test]
    fn test_circle_distance() {
        assert_eq!(circle_distance("A minor", "E minor"), Some(1));
        assert_eq!(circle_distance("C", "F"), Some(1)); // wraps around
        assert_eq!(circle_distance("C", "D"), Some(2));
        assert_eq!(circle_distance("C", "F#"), Some(6));
        assert_eq!(circle_distance("Am", "A minor"), Some(0));
        assert_eq!(circle_distance("C", "unknown"), None);
    }

    #[test]
    fn test_cue_type_labels() {
        assert_eq!(CueType::Intro.default_label(), Some("Intro End"));
        assert_eq!(CueType::Custom.default_label(), None);
        assert_eq!(CueType::from_str("Drop"), Some(CueType::Drop));
        assert_eq!(CueType::Outro.to_string(), "outro");
    }
}
