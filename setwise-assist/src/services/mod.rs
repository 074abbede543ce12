//! Track-assistance heuristics
//!
//! Pure, synchronous functions over in-memory inputs. Nothing here touches
//! the database or the clock, so handlers call them inline.

pub mod compatibility_scorer;
pub mod cue_point_detector;
pub mod energy_profiler;
pub mod set_suggester;
pub mod tag_inference;

pub use compatibility_scorer::score_candidate;
pub use cue_point_detector::{CueIdGenerator, CuePointDetector};
pub use energy_profiler::{compute_energy_curve, ENERGY_SEGMENTS};
pub use set_suggester::SetSuggester;
pub use tag_inference::{infer_tags, TrackMetadata};
