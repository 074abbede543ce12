//! # Setwise Common Library
//!
//! Shared code for the Setwise services including:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Timestamp helpers
//! - Music vocabulary (energy levels, cue types, keys, transitions)

pub mod config;
pub mod error;
pub mod music;
pub mod time;

pub use error::{Error, Result};
pub use music::{CueType, EnergyLevel, TransitionType, VocalType};
