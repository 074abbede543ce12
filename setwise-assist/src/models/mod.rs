//! Data models for setwise-assist
//!
//! Request/response bodies use camelCase on the wire.

pub mod cue_points;
pub mod parameters;
pub mod set_state;
pub mod suggestions;
pub mod tags;

pub use cue_points::{
    AddCuePointRequest, CuePoint, CuePointAnalysisRequest, CuePointAnalysisResponse,
    SaveCuePointsRequest, TrackCuePoints, UpdateCuePointRequest, WaveformInput,
};
pub use parameters::{AssistParameters, CueDetectionParameters, SuggestionParameters};
pub use set_state::{
    HistoryQuery, SetHistoryEntry, SetState, SetTrackRequest, SetTrackSnapshot,
    DEFAULT_RECENT_HISTORY, HISTORY_CAPACITY,
};
pub use suggestions::{
    ReferenceTrack, SetSuggestionRequest, SetSuggestionResponse, SuggestionHistoryEntry,
    TrackSignature, TrackSuggestion,
};
pub use tags::{
    SaveTagsRequest, TagSet, TagSuggestionRequest, TagSuggestionResponse, TaggedTrack,
    UntaggedTracksRequest, UntaggedTracksResponse,
};
