//! # rhythm-timeline
//!
//! Turn a music track into a per-beat timeline for audio-reactive visuals.
//!
//! The library decodes an audio file, extracts beat, onset, energy and
//! brightness series, fuses them into classified beats, tempo changes,
//! energy peaks and silent periods, and emits the result as a JavaScript
//! module and as JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rhythm_timeline::{config::Config, pipeline::AnalysisEngine};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let engine = AnalysisEngine::new(Config::default())?;
//! let report = engine.run("song.mp3").await?;
//!
//! if let Some(state) = report.timeline.state_at(12.5) {
//!     println!("{:.1} BPM, energy {:.2}", state.beat.bpm, state.beat.energy);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`audio`] - Decoding and the spectral front-end
//! - [`fusion`] - Beat merging, tempo tracking, rhythm, energy and silence
//! - [`timeline`] - The enriched per-beat timeline and its playback queries
//! - [`output`] - JavaScript, JSON and presentation document emission
//! - [`pipeline`] - The engine running all of the above
//! - [`config`] - Configuration management

pub mod audio;
pub mod config;
pub mod error;
pub mod fusion;
pub mod output;
pub mod pipeline;
pub mod timeline;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{Result, TimelineError},
    pipeline::{AnalysisEngine, AnalysisReport},
    timeline::Timeline,
};
