//! # Timeline
//!
//! The exported per-beat model and its two playback-time queries:
//! [`Timeline::state_at`] and [`Timeline::silence_at`].

pub mod synthesizer;
pub mod types;

pub use synthesizer::TimelineSynthesizer;
pub use types::{AudioState, EnrichedBeat, SilenceState, Timeline, TimelineStats};
