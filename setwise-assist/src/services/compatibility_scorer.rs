//! Next-track compatibility scoring
//!
//! A candidate starts at [`BASE_SCORE`] and gains or loses points for tempo
//! closeness, harmonic distance, energy progression and artist repetition.
//! The result is clamped to [0, 1].

use std::collections::HashSet;

use setwise_common::music::{circle_distance, usable_bpm};
use setwise_common::EnergyLevel;

use crate::models::{ReferenceTrack, TrackSignature};

/// Starting score for every candidate
pub const BASE_SCORE: f64 = 0.5;

/// Penalty for an artist heard in the recent history
pub const REPEATED_ARTIST_PENALTY: f64 = 0.1;

/// Tempo closeness term
pub fn bpm_term(reference_bpm: f64, candidate_bpm: f64) -> f64 {
    let diff = (candidate_bpm - reference_bpm).abs();
    if diff <= 5.0 {
        0.3
    } else if diff <= 10.0 {
        0.15
    } else if diff <= 20.0 {
        0.05
    } else {
        -0.1
    }
}

/// Harmonic term from circle-of-fifths distance; unparseable keys score 0
pub fn key_term(reference_key: &str, candidate_key: &str) -> f64 {
    match circle_distance(reference_key, candidate_key) {
        Some(0) => 0.2,
        Some(1) => 0.15,
        Some(2) => 0.1,
        _ => 0.0,
    }
}

/// Energy progression term
///
/// Holding or raising energy by one step is preferred. A jump of more than
/// one step up is penalized; a two-step drop is neither rewarded nor
/// penalized.
pub fn energy_term(reference: EnergyLevel, candidate: EnergyLevel) -> f64 {
    match candidate.ordinal() - reference.ordinal() {
        0 => 0.1,
        1 => 0.15,
        -1 => 0.05,
        d if d > 1 => -0.1,
        _ => 0.0,
    }
}

/// Score a candidate against the reference track
///
/// Without a reference only the repetition penalty applies. Each optional
/// field that is missing on either side skips its term.
pub fn score_candidate(
    reference: Option<&ReferenceTrack>,
    candidate: &TrackSignature,
    recent_artists: &HashSet<String>,
) -> f64 {
    let mut score = BASE_SCORE;

    if let Some(reference) = reference {
        if let (Some(r), Some(c)) = (usable_bpm(reference.bpm), usable_bpm(candidate.bpm)) {
            score += bpm_term(r, c);
        }

        if let (Some(r), Some(c)) = (reference.key.as_deref(), candidate.key.as_deref()) {
            score += key_term(r, c);
        }

        score += energy_term(reference.energy_level(), EnergyLevel::from_bpm(candidate.bpm));
    }

    if candidate
        .artist
        .as_ref()
        .is_some_and(|artist| recent_artists.contains(artist))
    {
        score -= REPEATED_ARTIST_PENALTY;
    }

    score.clamp(0.0, 1.0)
}
