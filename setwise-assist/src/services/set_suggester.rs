//! Next-track suggestions for a live set
//!
//! Ranks unplayed candidates with the compatibility scorer and attaches a
//! cue-in offset and transition style to each of the best ones.

use std::collections::{HashMap, HashSet};

use setwise_common::music::usable_bpm;
use setwise_common::{EnergyLevel, TransitionType};

use crate::models::{
    ReferenceTrack, SuggestionHistoryEntry, SuggestionParameters, TrackSignature, TrackSuggestion,
};
use crate::services::compatibility_scorer::score_candidate;

/// Cue-in offsets never exceed this many seconds
const MAX_CUE_IN_SECONDS: u32 = 30;

/// Cue-in offset for a candidate: a tenth of a nominal track length
fn cue_in_seconds(bpm: Option<f64>) -> u32 {
    let nominal_length = if usable_bpm(bpm).is_some() { 240.0 } else { 180.0 };
    ((nominal_length * 0.1_f64).floor() as u32).min(MAX_CUE_IN_SECONDS)
}

/// Set suggestion engine
#[derive(Debug, Clone, Default)]
pub struct SetSuggester {
    params: SuggestionParameters,
}

impl SetSuggester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(params: SuggestionParameters) -> Self {
        Self { params }
    }

    /// Artists of the most recent history entries, looked up among `candidates`
    fn recent_artists(
        &self,
        history: &[SuggestionHistoryEntry],
        candidates: &[TrackSignature],
    ) -> HashSet<String> {
        let mut by_id: HashMap<&str, &TrackSignature> = HashMap::with_capacity(candidates.len());
        for track in candidates {
            by_id.entry(track.id.as_str()).or_insert(track);
        }

        let window_start = history.len().saturating_sub(self.params.recent_artist_window);
        history[window_start..]
            .iter()
            .filter_map(|entry| by_id.get(entry.track_id.as_str()))
            .filter_map(|track| track.artist.clone())
            .collect()
    }

    /// Rank candidates that have not been played yet
    ///
    /// Ties keep their original candidate order. Returns an empty list when
    /// every candidate is already in `history`.
    pub fn suggest_next(
        &self,
        reference: Option<&ReferenceTrack>,
        history: &[SuggestionHistoryEntry],
        candidates: &[TrackSignature],
    ) -> Vec<TrackSuggestion> {
        self.suggest_next_excluding(reference, history, candidates, None)
    }

    /// Like [`Self::suggest_next`], also leaving out `playing`
    ///
    /// The playing track is never suggested but does not count towards the
    /// recent-artist window.
    pub fn suggest_next_excluding(
        &self,
        reference: Option<&ReferenceTrack>,
        history: &[SuggestionHistoryEntry],
        candidates: &[TrackSignature],
        playing: Option<&str>,
    ) -> Vec<TrackSuggestion> {
        let mut played: HashSet<&str> = history.iter().map(|h| h.track_id.as_str()).collect();
        played.extend(playing);
        let available: Vec<&TrackSignature> = candidates
            .iter()
            .filter(|t| !played.contains(t.id.as_str()))
            .collect();

        if available.is_empty() {
            tracing::debug!(candidates = candidates.len(), "No unplayed candidates left");
            return Vec::new();
        }

        let recent_artists = self.recent_artists(history, candidates);

        let mut scored: Vec<(&TrackSignature, f64)> = available
            .into_iter()
            .map(|track| (track, score_candidate(reference, track, &recent_artists)))
            .collect();

        // sort_by is stable, so equal scores keep candidate order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.params.max_suggestions);

        let reference_bpm = reference.and_then(|r| usable_bpm(r.bpm));

        scored
            .into_iter()
            .map(|(track, score)| {
                let bpm_delta = reference_bpm
                    .zip(usable_bpm(track.bpm))
                    .map(|(r, c)| c - r);

                TrackSuggestion {
                    track_id: track.id.clone(),
                    title: track.title.clone(),
                    artist: track.artist.clone(),
                    bpm: track.bpm,
                    key: track.key.clone(),
                    energy: EnergyLevel::from_bpm(track.bpm),
                    cue_point: cue_in_seconds(track.bpm),
                    transition_type: TransitionType::from_bpm_delta(bpm_delta),
                    confidence: score,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, artist: Option<&str>, bpm: Option<f64>, key: Option<&str>) -> TrackSignature {
        TrackSignature {
            id: id.to_string(),
            title: format!("Title {}", id),
            artist: artist.map(str::to_string),
            bpm,
            key: key.map(str::to_string),
            duration_seconds: None,
        }
    }

    fn played(id: &str) -> SuggestionHistoryEntry {
        SuggestionHistoryEntry {
            track_id: id.to_string(),
            bpm: None,
            key: None,
            energy: Some("medium".to_string()),
        }
    }

    fn reference(bpm: f64, key: &str) -> ReferenceTrack {
        ReferenceTrack {
            track_id: Some("now".to_string()),
            bpm: Some(bpm),
            key: Some(key.to_string()),
            energy: Some("medium".to_string()),
        }
    }

    fn ids(suggestions: &[TrackSuggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.track_id.as_str()).collect()
    }

    #[test]
    fn test_excludes_history_and_empty_when_all_played() {
        let tracks = vec![track("a", None, None, None), track("b", None, None, None)];
        let history = vec![played("a"), played("b")];

        assert!(SetSuggester::new().suggest_next(None, &history, &tracks).is_empty());

        let suggestions = SetSuggester::new().suggest_next(None, &history[..1], &tracks);
        assert_eq!(ids(&suggestions), vec!["b"]);
    }

    #[test]
    fn test_ranks_by_score_and_limits_to_five() {
        let r = reference(128.0, "A minor");
        let tracks = vec![
            track("far", None, Some(90.0), Some("F#")),
            track("close", None, Some(130.0), Some("E minor")),
            track("ok", None, Some(137.0), Some("D")),
            track("t4", None, None, None),
            track("t5", None, None, None),
            track("t6", None, None, None),
            track("t7", None, None, None),
        ];

        let suggestions = SetSuggester::new().suggest_next(Some(&r), &[], &tracks);

        assert_eq!(suggestions.len(), 5);
        assert_eq!(suggestions[0].track_id, "close");
        assert_eq!(suggestions[0].confidence, 1.0);
        assert_eq!(suggestions[1].track_id, "ok");
        // equal scores keep input order
        assert_eq!(ids(&suggestions)[2..], ["t4", "t5", "t6"]);
        for pair in suggestions.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_ties_preserve_candidate_order() {
        let tracks: Vec<_> = ["e", "d", "c", "b", "a"]
            .iter()
            .map(|id| track(id, None, None, None))
            .collect();
        let suggestions = SetSuggester::new().suggest_next(None, &[], &tracks);
        assert_eq!(ids(&suggestions), vec!["e", "d", "c", "b", "a"]);
    }

    #[test]
    fn test_recent_artist_penalty_uses_last_five_history_entries() {
        let tracks = vec![
            track("old", Some("Old Artist"), None, None),
            track("h1", Some("Recent"), None, None),
            track("h2", None, None, None),
            track("h3", None, None, None),
            track("h4", None, None, None),
            track("h5", None, None, None),
            track("new-old", Some("Old Artist"), None, None),
            track("new-recent", Some("Recent"), None, None),
            track("new-other", Some("Other"), None, None),
        ];
        let history: Vec<_> = ["old", "h1", "h2", "h3", "h4", "h5"]
            .iter()
            .map(|id| played(id))
            .collect();

        let suggestions = SetSuggester::new().suggest_next(None, &history, &tracks);

        // "old" fell out of the five-entry window, so only "Recent" is penalized
        assert_eq!(ids(&suggestions), vec!["new-old", "new-other", "new-recent"]);
        assert_eq!(suggestions[0].confidence, 0.5);
        assert!((suggestions[2].confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_playing_track_is_excluded_but_not_in_artist_window() {
        let tracks = vec![
            track("h1", Some("Recent"), None, None),
            track("h2", None, None, None),
            track("h3", None, None, None),
            track("h4", None, None, None),
            track("h5", None, None, None),
            track("now", Some("Playing"), None, None),
            track("by-playing", Some("Playing"), None, None),
            track("by-recent", Some("Recent"), None, None),
        ];
        let history: Vec<_> = ["h1", "h2", "h3", "h4", "h5"]
            .iter()
            .map(|id| played(id))
            .collect();

        let suggestions =
            SetSuggester::new().suggest_next_excluding(None, &history, &tracks, Some("now"));

        assert_eq!(ids(&suggestions), vec!["by-playing", "by-recent"]);
        assert_eq!(suggestions[0].confidence, 0.5);
        assert!((suggestions[1].confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_cue_point_transition_and_energy() {
        let r = reference(128.0, "C");
        let tracks = vec![
            track("beat", None, Some(129.5), None),
            track("fade", None, Some(132.0), None),
            track("cut", None, Some(95.0), None),
            track("nobpm", None, None, None),
        ];

        let suggestions = SetSuggester::new().suggest_next(Some(&r), &[], &tracks);
        let by_id = |id: &str| suggestions.iter().find(|s| s.track_id == id).unwrap();

        assert_eq!(by_id("beat").transition_type, TransitionType::Beatmatch);
        assert_eq!(by_id("beat").cue_point, 24);
        assert_eq!(by_id("beat").energy, EnergyLevel::Medium);
        assert_eq!(by_id("fade").transition_type, TransitionType::Fade);
        assert_eq!(by_id("fade").energy, EnergyLevel::High);
        assert_eq!(by_id("cut").transition_type, TransitionType::Cut);
        assert_eq!(by_id("cut").energy, EnergyLevel::Low);
        assert_eq!(by_id("nobpm").transition_type, TransitionType::Fade);
        assert_eq!(by_id("nobpm").cue_point, 18);
    }

    #[test]
    fn test_without_reference_transition_is_fade() {
        let tracks = vec![track("a", None, Some(128.0), None)];
        let suggestions = SetSuggester::new().suggest_next(None, &[], &tracks);
        assert_eq!(suggestions[0].transition_type, TransitionType::Fade);
    }

    #[test]
    fn test_custom_limit() {
        let tracks: Vec<_> = (0..10).map(|i| track(&format!("t{}", i), None, None, None)).collect();
        let suggester = SetSuggester::with_parameters(SuggestionParameters {
            max_suggestions: 3,
            ..Default::default()
        });
        assert_eq!(suggester.suggest_next(None, &[], &tracks).len(), 3);
    }

    #[test]
    fn test_deterministic() {
        let r = reference(124.0, "G");
        let tracks: Vec<_> = (0..12)
            .map(|i| track(&format!("t{}", i), Some("A"), Some(110.0 + i as f64 * 3.0), Some("D")))
            .collect();
        let suggester = SetSuggester::new();
        assert_eq!(
            suggester.suggest_next(Some(&r), &[], &tracks),
            suggester.suggest_next(Some(&r), &[], &tracks)
        );
    }
}
