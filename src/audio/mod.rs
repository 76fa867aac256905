//! # Audio Front-End
//!
//! Decodes audio files and extracts the time-indexed feature series that the
//! [`fusion`](crate::fusion) stages combine into a timeline.
//!
//! ## Core Features
//!
//! - **Loading**: WAV through hound, compressed formats through symphonia
//! - **Energy**: per-frame RMS aligned with the STFT hop
//! - **Brightness**: spectral centroid and 85% rolloff per frame
//! - **Onsets and Beats**: log spectral flux envelope, peak-picked onsets and
//!   an autocorrelation-driven beat grid
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rhythm_timeline::audio::{AudioLoader, FeatureExtractor};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let audio = AudioLoader::load("song.mp3").await?;
//! let series = FeatureExtractor::new().extract(&audio)?;
//!
//! println!("{} beat candidates, {} onsets", series.beat_times.len(), series.onset_times.len());
//! # Ok(())
//! # }
//! ```

pub mod features;
pub mod loader;
pub mod types;

pub use features::FeatureExtractor;
pub use loader::AudioLoader;
pub use types::{AnalysisConfig, AudioData, AudioFormat, FeatureSeries, FrameMapping};
