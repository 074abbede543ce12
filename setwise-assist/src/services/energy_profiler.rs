//! Waveform energy profiling
//!
//! Reduces a raw sample sequence to a fixed-length loudness curve used as a
//! proxy for song structure.

/// Number of segments in every non-empty energy curve
pub const ENERGY_SEGMENTS: usize = 100;

/// Compute the normalized RMS energy curve of a waveform
///
/// The waveform is cut into [`ENERGY_SEGMENTS`] slices of
/// `len / ENERGY_SEGMENTS` samples; trailing samples beyond the last full
/// slice are ignored. Each value is divided by the curve maximum, unless
/// that maximum is zero, in which case the zeros are returned as-is.
///
/// Empty input yields an empty curve. Inputs shorter than
/// [`ENERGY_SEGMENTS`] produce empty slices, which count as silence.
pub fn compute_energy_curve(samples: &[f64]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let segment_size = samples.len() / ENERGY_SEGMENTS;

    let energy: Vec<f64> = (0..ENERGY_SEGMENTS)
        .map(|i| {
            let start = (i * segment_size).min(samples.len());
            let end = (start + segment_size).min(samples.len());
            calculate_rms(&samples[start..end])
        })
        .collect();

    let max_energy = energy.iter().copied().fold(0.0_f64, f64::max);
    if max_energy > 0.0 {
        energy.into_iter().map(|e| e / max_energy).collect()
    } else {
        energy
    }
}

/// Root mean square of a slice (0.0 for an empty slice)
fn calculate_rms(segment: &[f64]) -> f64 {
    if segment.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = segment.iter().map(|s| s * s).sum();
    (sum_squares / segment.len() as f64).sqrt()
}
