//! Rule-based tag inference
//!
//! Derives energy, mood, instrumentation and vocal type from a track's
//! title, genre and tempo using fixed keyword tables.

use setwise_common::{EnergyLevel, VocalType};

use crate::models::TagSet;

/// Mood assigned when no keyword matches
pub const DEFAULT_MOOD: &str = "neutral";

/// Instrumentation list is cut to this length
pub const MAX_INSTRUMENTATION: usize = 3;

/// Title keywords per mood, in priority order
const MOOD_KEYWORDS: &[(&str, &[&str])] = &[
    ("energetic", &["energy", "party", "dance", "upbeat", "fire", "power"]),
    ("chill", &["chill", "relax", "calm", "peace", "soft", "ambient"]),
    ("melancholic", &["sad", "lonely", "dark", "rain", "tears", "hurt"]),
    ("uplifting", &["happy", "joy", "sunshine", "bright", "celebrate", "victory"]),
    ("aggressive", &["rage", "angry", "fight", "war", "metal", "hard"]),
];

/// Genre keywords and the instruments they imply
const GENRE_INSTRUMENTS: &[(&[&str], &[&str])] = &[
    (&["electronic", "edm", "techno"], &["synth", "drum machine"]),
    (&["rock", "metal"], &["guitar", "drums", "bass"]),
    (&["jazz"], &["piano", "saxophone", "double bass"]),
    (&["hip", "rap"], &["drum machine", "bass"]),
];

/// Title words that mark a track as instrumental
const INSTRUMENTAL_MARKERS: &[&str] = &["instrumental", "beat"];

/// Metadata consulted by [`infer_tags`]
///
/// Artist, album, key and duration never influence the result, so they
/// are not part of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackMetadata<'a> {
    pub title: &'a str,
    pub genre: Option<&'a str>,
    pub bpm: Option<f64>,
}

fn infer_mood(title_lower: &str) -> &'static str {
    MOOD_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| title_lower.contains(kw)))
        .map(|(mood, _)| *mood)
        .unwrap_or(DEFAULT_MOOD)
}

fn infer_instrumentation(genre_lower: &str) -> Vec<String> {
    let mut instruments: Vec<String> = GENRE_INSTRUMENTS
        .iter()
        .filter(|(genres, _)| genres.iter().any(|g| genre_lower.contains(g)))
        .flat_map(|(_, instruments)| instruments.iter().map(|i| i.to_string()))
        .take(MAX_INSTRUMENTATION)
        .collect();

    if instruments.is_empty() {
        instruments.push("mixed".to_string());
    }
    instruments
}

fn infer_vocal_type(title_lower: &str) -> VocalType {
    if INSTRUMENTAL_MARKERS.iter().any(|m| title_lower.contains(m)) {
        VocalType::Instrumental
    } else {
        VocalType::Vocal
    }
}

/// Infer descriptive tags for a track
///
/// Era is never inferred and is always `None`.
pub fn infer_tags(track: &TrackMetadata<'_>) -> TagSet {
    let title_lower = track.title.to_lowercase();
    let genre_lower = track.genre.unwrap_or_default().to_lowercase();

    let tags = TagSet {
        energy: EnergyLevel::from_bpm(track.bpm),
        mood: infer_mood(&title_lower).to_string(),
        instrumentation: infer_instrumentation(&genre_lower),
        vocal_type: infer_vocal_type(&title_lower),
        era: None,
    };

    tracing::debug!(title = track.title, ?tags, "Inferred tags");
    tags
}
