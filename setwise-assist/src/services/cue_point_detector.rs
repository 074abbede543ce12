//! Structural cue point detection
//!
//! Finds the end of the intro, the drop and the start of the outro from an
//! energy curve, falling back to tempo- or duration-based estimates when
//! the curve is missing or shows no clear structure. Unreliable detections
//! are left out of the result instead of raising an error.

use std::sync::atomic::{AtomicU64, Ordering};

use setwise_common::music::usable_bpm;
use setwise_common::CueType;

use crate::models::{CueDetectionParameters, CuePoint};

/// Intro fallbacks never exceed this many seconds
const MAX_INTRO_SECONDS: f64 = 30.0;
/// Intro fallback length in bars when tempo is known
const INTRO_FALLBACK_BARS: f64 = 8.0;
/// Intro fallback as a fraction of duration when tempo is unknown
const INTRO_FALLBACK_FRACTION: f64 = 0.1;
/// Drop fallback position in bars from the start
const DROP_FALLBACK_BARS: f64 = 32.0;
/// Drop fallback as a fraction of duration
const DROP_FALLBACK_FRACTION: f64 = 0.4;
/// A drop must land before this fraction of the track
const DROP_LATEST_FRACTION: f64 = 0.9;
/// Outro fallback as a fraction of duration
const OUTRO_FALLBACK_FRACTION: f64 = 0.85;
/// An outro must start at least this many seconds before the end
const OUTRO_MIN_TAIL_SECONDS: f64 = 10.0;

/// Monotonic cue id source, e.g. `intro-1`, `drop-2`
///
/// Shared across requests through `AppState`; ids are unique for the
/// lifetime of the generator.
#[derive(Debug, Default)]
pub struct CueIdGenerator {
    next: AtomicU64,
}

impl CueIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_id(&self, cue_type: CueType) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", cue_type.as_str(), n)
    }
}

/// Duration of one 4/4 bar in seconds
fn bar_seconds(bpm: f64) -> f64 {
    (60.0 / bpm) * 4.0
}

/// Cue point detector
#[derive(Debug, Clone, Default)]
pub struct CuePointDetector {
    params: CueDetectionParameters,
}

impl CuePointDetector {
    /// Create detector with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create detector with tuned thresholds
    pub fn with_parameters(params: CueDetectionParameters) -> Self {
        Self { params }
    }

    /// Detect intro/drop/outro cue points, sorted by time
    ///
    /// `duration` must be positive; a non-positive or non-finite duration
    /// yields no cues. `energy` may be empty.
    pub fn detect(
        &self,
        duration: f64,
        bpm: Option<f64>,
        energy: &[f64],
        ids: &CueIdGenerator,
    ) -> Vec<CuePoint> {
        if !duration.is_finite() || duration <= 0.0 {
            return Vec::new();
        }
        let bpm = usable_bpm(bpm);

        let mut cue_points = Vec::with_capacity(3);
        let mut push = |cue_type: CueType, time: f64| {
            cue_points.push(CuePoint {
                id: ids.next_id(cue_type),
                cue_type,
                time,
                label: cue_type.default_label().map(str::to_string),
            });
        };

        let intro_end = self.find_intro_end(energy, duration, bpm);
        let intro_admitted = intro_end < duration;
        if intro_admitted {
            push(CueType::Intro, intro_end);
        }

        let drop = self.find_drop(energy, duration, intro_end, bpm);
        let drop_admitted = drop > intro_end && drop < duration * DROP_LATEST_FRACTION;
        if drop_admitted {
            push(CueType::Drop, drop);
        }

        // Latest cue so far; the outro must come after it
        let latest = match (intro_admitted, drop_admitted) {
            (_, true) => Some(drop),
            (true, false) => Some(intro_end),
            (false, false) => None,
        };

        let outro_start = self.find_outro_start(energy, duration);
        if outro_start < duration - OUTRO_MIN_TAIL_SECONDS
            && latest.map_or(true, |t| outro_start > t)
        {
            push(CueType::Outro, outro_start);
        }

        cue_points.sort_by(|a, b| a.time.total_cmp(&b.time));

        tracing::debug!(
            duration,
            ?bpm,
            curve_len = energy.len(),
            intro_end,
            drop,
            outro_start,
            emitted = cue_points.len(),
            "Cue point detection complete"
        );

        cue_points
    }

    /// First segment loud enough to count as the track "starting"
    fn find_intro_end(&self, energy: &[f64], duration: f64, bpm: Option<f64>) -> f64 {
        if !energy.is_empty() {
            let len = energy.len() as f64;
            let scan_limit =
                (len * self.params.intro_scan_fraction).min(self.params.intro_scan_max_segments as f64);

            if let Some(i) = energy
                .iter()
                .enumerate()
                .take_while(|(i, _)| (*i as f64) < scan_limit)
                .find(|(_, &e)| e > self.params.intro_energy_threshold)
                .map(|(i, _)| i)
            {
                return (i as f64 / len) * duration;
            }
        }

        match bpm {
            Some(bpm) => (bar_seconds(bpm) * INTRO_FALLBACK_BARS).min(MAX_INTRO_SECONDS),
            None => (duration * INTRO_FALLBACK_FRACTION).min(MAX_INTRO_SECONDS),
        }
    }

    /// Highest energy peak between the intro and the search window end
    fn find_drop(&self, energy: &[f64], duration: f64, intro_end: f64, bpm: Option<f64>) -> f64 {
        let latest = duration * DROP_LATEST_FRACTION;
        let in_window = |t: f64| t > intro_end && t < latest;

        if !energy.is_empty() {
            let len = energy.len();
            let start = (((intro_end / duration) * len as f64).floor().max(0.0) as usize).min(len);
            let end = ((self.params.drop_search_end_fraction * len as f64).floor() as usize).min(len);

            let mut max_energy = 0.0;
            let mut max_index = start;
            for (i, &e) in energy.iter().enumerate().take(end).skip(start) {
                if e > max_energy {
                    max_energy = e;
                    max_index = i;
                }
            }

            if max_energy > self.params.drop_peak_threshold {
                let drop_time = (max_index as f64 / len as f64) * duration;
                if in_window(drop_time) {
                    return drop_time;
                }
            }
        }

        bpm.map(|bpm| bar_seconds(bpm) * DROP_FALLBACK_BARS)
            .filter(|&t| in_window(t))
            .unwrap_or(duration * DROP_FALLBACK_FRACTION)
    }

    /// First segment after the outro mark that falls well below the average
    fn find_outro_start(&self, energy: &[f64], duration: f64) -> f64 {
        let fallback = duration * OUTRO_FALLBACK_FRACTION;
        if energy.is_empty() {
            return fallback;
        }

        let len = energy.len();
        let start = ((self.params.outro_start_fraction * len as f64).floor() as usize).min(len);
        if start == 0 {
            return fallback;
        }

        let average = energy[..start].iter().sum::<f64>() / start as f64;
        let cutoff = average * self.params.outro_drop_ratio;

        energy[start..]
            .iter()
            .position(|&e| e < cutoff)
            .map(|offset| ((start + offset) as f64 / len as f64) * duration)
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::energy_profiler::compute_energy_curve;

    fn detect(duration: f64, bpm: Option<f64>, energy: &[f64]) -> Vec<CuePoint> {
        CuePointDetector::new().detect(duration, bpm, energy, &CueIdGenerator::new())
    }

    /// (type, time) pairs with times rounded to the microsecond
    fn times(cues: &[CuePoint]) -> Vec<(CueType, f64)> {
        cues.iter()
            .map(|c| (c.cue_type, (c.time * 1e6).round() / 1e6))
            .collect()
    }

    fn assert_well_formed(cues: &[CuePoint], duration: f64) {
        for cue in cues {
            assert!(cue.time >= 0.0 && cue.time <= duration, "{:?} out of range", cue);
        }
        for pair in cues.windows(2) {
            assert!(pair[0].time < pair[1].time, "not strictly ascending: {:?}", cues);
        }
    }

    #[test]
    fn test_bpm_fallback_without_waveform() {
        let cues = detect(240.0, Some(128.0), &[]);

        assert_eq!(
            times(&cues),
            vec![(CueType::Intro, 15.0), (CueType::Drop, 60.0), (CueType::Outro, 204.0)]
        );
        assert_eq!(cues[0].label.as_deref(), Some("Intro End"));
        assert_eq!(cues[1].label.as_deref(), Some("Drop"));
        assert_eq!(cues[2].label.as_deref(), Some("Outro Start"));
    }

    #[test]
    fn test_duration_fallback_without_bpm() {
        let cues = detect(200.0, None, &[]);

        // intro 10% = 20s, drop 40% = 80s, outro 85% = 170s
        assert_eq!(
            times(&cues),
            vec![(CueType::Intro, 20.0), (CueType::Drop, 80.0), (CueType::Outro, 170.0)]
        );
    }

    #[test]
    fn test_intro_fallback_capped_at_thirty_seconds() {
        let cues = detect(600.0, None, &[]);
        assert_eq!(cues[0].cue_type, CueType::Intro);
        assert_eq!(cues[0].time, 30.0);

        // 8 bars at 60 BPM = 32s, capped
        let cues = detect(600.0, Some(60.0), &[]);
        assert_eq!(cues[0].time, 30.0);
    }

    #[test]
    fn test_short_track_drops_outro() {
        // outro fallback 0.85 * 40 = 34 >= 40 - 10
        let cues = detect(40.0, None, &[]);
        assert!(cues.iter().all(|c| c.cue_type != CueType::Outro));
        assert_well_formed(&cues, 40.0);
    }

    #[test]
    fn test_outro_never_precedes_drop() {
        // 32 bars at 128 BPM = 60s is a valid drop, but the outro fallback
        // 0.85 * 70 = 59.5 would land before it
        let cues = detect(70.0, Some(128.0), &[]);
        assert_eq!(times(&cues), vec![(CueType::Intro, 15.0), (CueType::Drop, 60.0)]);
    }

    #[test]
    fn test_bpm_drop_outside_window_uses_percentage() {
        // 32 bars at 70 BPM ~ 109.7s > 0.9 * 100
        let cues = detect(100.0, Some(70.0), &[]);
        let drop = cues.iter().find(|c| c.cue_type == CueType::Drop).unwrap();
        assert!((drop.time - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_energy_curve_structure() {
        // quiet intro, peak at 40%, high body, quiet tail
        let mut energy = vec![0.1; 100];
        for e in energy.iter_mut().take(80).skip(10) {
            *e = 0.7;
        }
        energy[40] = 1.0;

        let cues = detect(300.0, Some(128.0), &energy);

        // intro at segment 10 -> 30s, drop at segment 40 -> 120s,
        // outro at segment 80 -> 240s
        assert_eq!(
            times(&cues),
            vec![(CueType::Intro, 30.0), (CueType::Drop, 120.0), (CueType::Outro, 240.0)]
        );
    }

    #[test]
    fn test_weak_peak_falls_back_to_bpm() {
        let mut energy = vec![0.5; 100];
        energy[0] = 0.0;
        let cues = detect(240.0, Some(128.0), &energy);

        // intro at segment 1 -> 2.4s; no peak above 0.6 so 32 bars = 60s
        let drop = cues.iter().find(|c| c.cue_type == CueType::Drop).unwrap();
        assert_eq!(drop.time, 60.0);
        assert!((cues[0].time - 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_silent_curve_uses_fallbacks() {
        let energy = compute_energy_curve(&vec![0.0; 10_000]);
        let cues = detect(240.0, Some(128.0), &energy);

        // No intro above threshold -> 15s. Drop search finds nothing -> 60s.
        // Average 0, nothing falls below 0 -> 204s.
        assert_eq!(
            times(&cues),
            vec![(CueType::Intro, 15.0), (CueType::Drop, 60.0), (CueType::Outro, 204.0)]
        );
    }

    #[test]
    fn test_invalid_duration_yields_nothing() {
        assert!(detect(0.0, Some(128.0), &[]).is_empty());
        assert!(detect(-5.0, None, &[]).is_empty());
        assert!(detect(f64::NAN, None, &[]).is_empty());
    }

    #[test]
    fn test_zero_bpm_treated_as_missing() {
        assert_eq!(times(&detect(200.0, Some(0.0), &[])), times(&detect(200.0, None, &[])));
    }

    #[test]
    fn test_cues_well_formed_across_inputs() {
        let curves: Vec<Vec<f64>> = vec![
            vec![],
            vec![1.0; 100],
            (0..100).map(|i| i as f64 / 99.0).collect(),
            (0..100).map(|i| 1.0 - i as f64 / 99.0).collect(),
            (0..100).map(|i| if i % 7 == 0 { 1.0 } else { 0.2 }).collect(),
        ];
        for duration in [5.0, 12.0, 45.0, 70.0, 180.0, 240.0, 900.0] {
            for bpm in [None, Some(60.0), Some(128.0), Some(174.0)] {
                for curve in &curves {
                    let cues = detect(duration, bpm, curve);
                    assert_well_formed(&cues, duration);
                    assert!(cues.len() <= 3);
                }
            }
        }
    }

    #[test]
    fn test_ids_unique_and_deterministic_times() {
        let ids = CueIdGenerator::new();
        let detector = CuePointDetector::new();
        let first = detector.detect(240.0, Some(128.0), &[], &ids);
        let second = detector.detect(240.0, Some(128.0), &[], &ids);

        assert_eq!(times(&first), times(&second));
        assert_eq!(first[0].id, "intro-1");
        assert_eq!(first[1].id, "drop-2");
        assert_eq!(second[0].id, "intro-4");
    }

    #[test]
    fn test_tuned_parameters() {
        let params = CueDetectionParameters {
            intro_energy_threshold: 0.05,
            ..Default::default()
        };
        let mut energy = vec![0.1; 100];
        energy[0] = 0.0;
        let cues = CuePointDetector::with_parameters(params).detect(
            100.0,
            None,
            &energy,
            &CueIdGenerator::new(),
        );
        assert_eq!(cues[0].cue_type, CueType::Intro);
        assert!((cues[0].time - 1.0).abs() < 1e-9);
    }
}
