//! # Feature Fusion
//!
//! Turns the raw front-end series into beat, tempo, rhythm, energy and
//! silence annotations. Each stage is a pure function of its inputs and data
//! only flows forward:
//!
//! 1. [`beats::merge_beats`] - dedup + intensity classification
//! 2. [`tempo::track_tempo`] - sliding-window tempo-change events
//! 3. [`RhythmStats`] - inter-beat interval statistics
//! 4. [`energy::detect_energy_peaks`] and [`BrightnessSummary`]
//! 5. [`silence::detect_silence`] - minimum-duration silence segmentation
//!
//! [`FeatureFuser`] runs them in order and hands a [`FusedFeatures`] to the
//! [`timeline`](crate::timeline) synthesizer.

pub mod beats;
pub mod energy;
pub mod rhythm;
pub mod silence;
pub mod tempo;
pub mod types;

use serde::{Deserialize, Serialize};

use crate::audio::types::FeatureSeries;
use crate::error::{ConfigError, Result};

pub use silence::SilenceMap;
pub use types::{
    Beat, BeatType, BrightnessSummary, EnergyPeak, RhythmStats, SilenceInterval,
    TempoChangeEvent, TempoChangeKind,
};

/// Intensity above which a beat is `Strong`
pub const STRONG_INTENSITY_THRESHOLD: f32 = 0.6;
/// Lower clamp for normalized beat intensity
pub const MIN_BEAT_INTENSITY: f32 = 0.1;
/// Intensity for beats that fall outside the onset envelope
pub const DEFAULT_BEAT_INTENSITY: f32 = 0.5;
/// Beats per tempo window
pub const TEMPO_WINDOW_BEATS: usize = 8;
/// Beats between tempo window starts
pub const TEMPO_HOP_BEATS: usize = 4;
/// Relative tempo change needed to record a new tempo event
pub const TEMPO_CHANGE_RATIO: f64 = 0.1;
/// Energy peaks must exceed this multiple of the mean RMS
pub const ENERGY_PEAK_RATIO: f32 = 1.5;
/// Max distance (seconds) between a beat and the energy peak attached to it
pub const ENERGY_MATCH_TOLERANCE: f64 = 0.5;
/// Energy for beats with no peak within tolerance
pub const DEFAULT_BEAT_ENERGY: f32 = 0.5;
/// Silence threshold as a fraction of the mean RMS
pub const SILENCE_RATIO: f32 = 0.1;
/// Shortest low-energy run (seconds) reported as silence
pub const MIN_SILENCE_DURATION: f64 = 0.5;

/// Named thresholds for every fusion stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub strong_intensity: f32,
    pub min_intensity: f32,
    pub default_intensity: f32,
    pub tempo_window: usize,
    pub tempo_hop: usize,
    pub tempo_change_ratio: f64,
    pub energy_peak_ratio: f32,
    pub energy_tolerance: f64,
    pub default_beat_energy: f32,
    pub silence_ratio: f32,
    pub min_silence_duration: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            strong_intensity: STRONG_INTENSITY_THRESHOLD,
            min_intensity: MIN_BEAT_INTENSITY,
            default_intensity: DEFAULT_BEAT_INTENSITY,
            tempo_window: TEMPO_WINDOW_BEATS,
            tempo_hop: TEMPO_HOP_BEATS,
            tempo_change_ratio: TEMPO_CHANGE_RATIO,
            energy_peak_ratio: ENERGY_PEAK_RATIO,
            energy_tolerance: ENERGY_MATCH_TOLERANCE,
            default_beat_energy: DEFAULT_BEAT_ENERGY,
            silence_ratio: SILENCE_RATIO,
            min_silence_duration: MIN_SILENCE_DURATION,
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, value: String| -> crate::error::TimelineError {
            ConfigError::InvalidValue { key: format!("fusion.{}", key), value }.into()
        };

        if !(0.0..=1.0).contains(&self.min_intensity) {
            return Err(invalid("min_intensity", self.min_intensity.to_string()));
        }
        if !(self.min_intensity..=1.0).contains(&self.default_intensity) {
            return Err(invalid("default_intensity", self.default_intensity.to_string()));
        }
        if !(0.0..=1.0).contains(&self.strong_intensity) {
            return Err(invalid("strong_intensity", self.strong_intensity.to_string()));
        }
        if self.tempo_window < 2 {
            return Err(invalid("tempo_window", self.tempo_window.to_string()));
        }
        if self.tempo_hop == 0 {
            return Err(invalid("tempo_hop", self.tempo_hop.to_string()));
        }
        if !(self.tempo_change_ratio > 0.0 && self.tempo_change_ratio <= 1.0) {
            return Err(invalid("tempo_change_ratio", self.tempo_change_ratio.to_string()));
        }
        if self.energy_peak_ratio <= 0.0 {
            return Err(invalid("energy_peak_ratio", self.energy_peak_ratio.to_string()));
        }
        if self.energy_tolerance <= 0.0 {
            return Err(invalid("energy_tolerance", self.energy_tolerance.to_string()));
        }
        if !(self.silence_ratio > 0.0 && self.silence_ratio <= 1.0) {
            return Err(invalid("silence_ratio", self.silence_ratio.to_string()));
        }
        if self.min_silence_duration <= 0.0 {
            return Err(invalid("min_silence_duration", self.min_silence_duration.to_string()));
        }
        Ok(())
    }
}

/// Everything the fusion stages derive from one [`FeatureSeries`]
#[derive(Debug, Clone, PartialEq)]
pub struct FusedFeatures {
    pub beats: Vec<Beat>,

    /// `intervals[i]` is the gap between `beats[i]` and `beats[i + 1]`
    pub intervals: Vec<f64>,

    pub tempo_changes: Vec<TempoChangeEvent>,
    pub rhythm: RhythmStats,
    pub energy_peaks: Vec<EnergyPeak>,

    /// `(min, max)` RMS over the track
    pub energy_range: (f32, f32),

    pub brightness: BrightnessSummary,
    pub silence: SilenceMap,
    pub duration: f64,
}

/// Runs the fusion stages in dependency order
pub struct FeatureFuser {
    config: FusionConfig,
}

impl FeatureFuser {
    pub fn new() -> Self {
        Self::with_config(FusionConfig::default())
    }

    pub fn with_config(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn fuse(&self, series: &FeatureSeries) -> FusedFeatures {
        let config = &self.config;

        let beats = beats::merge_beats(
            &series.beat_times,
            &series.onset_times,
            &series.onset_envelope,
            &series.frames,
            series.envelope_max(),
            config,
        );
        tracing::debug!(
            "Merged {} beat candidates and {} onsets into {} beats",
            series.beat_times.len(),
            series.onset_times.len(),
            beats.len()
        );

        let tempo_changes =
            tempo::track_tempo(&beats, config.tempo_window, config.tempo_hop, config.tempo_change_ratio);
        tracing::debug!("Tempo changes: {}", tempo_changes.len());

        let intervals = rhythm::intervals(&beats);
        let rhythm = RhythmStats::from_intervals(&intervals);
        tracing::debug!(
            "Rhythm: mean interval {:.3}s, consistency {:.2}",
            rhythm.mean_interval,
            rhythm.consistency
        );

        let energy_peaks =
            energy::detect_energy_peaks(&series.rms, &series.times, config.energy_peak_ratio);
        let brightness =
            BrightnessSummary::from_series(&series.spectral_centroid, &series.spectral_rolloff);
        tracing::debug!(
            "Energy peaks: {}, average brightness {:.1} Hz",
            energy_peaks.len(),
            brightness.mean
        );

        let silence = silence::detect_silence(
            &series.rms,
            &series.times,
            series.duration,
            config.silence_ratio,
            config.min_silence_duration,
        );

        FusedFeatures {
            beats,
            intervals,
            tempo_changes,
            rhythm,
            energy_peaks,
            energy_range: energy::range(&series.rms),
            brightness,
            silence,
            duration: series.duration,
        }
    }
}

impl Default for FeatureFuser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::types::FrameMapping;

    fn empty_series() -> FeatureSeries {
        FeatureSeries::empty(3.0, FrameMapping::new(22050, 512))
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(FusionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_fusion_config() {
        let config = FusionConfig { tempo_window: 1, ..Default::default() };
        assert!(config.validate().is_err());

        let config = FusionConfig { min_silence_duration: 0.0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = FusionConfig { tempo_change_ratio: 0.0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_series_degrades_to_empty_outputs() {
        let fused = FeatureFuser::new().fuse(&empty_series());
        assert!(fused.beats.is_empty());
        assert!(fused.intervals.is_empty());
        assert!(fused.tempo_changes.is_empty());
        assert_eq!(fused.rhythm, RhythmStats::default());
        assert!(fused.energy_peaks.is_empty());
        assert!(fused.silence.intervals.is_empty());
        assert_eq!(fused.energy_range, (0.0, 0.0));
    }

    #[test]
    fn test_fuse_combines_both_candidate_sources() {
        let frames = FrameMapping::new(1000, 10);
        let mut series = FeatureSeries::empty(2.0, frames);
        series.beat_times = vec![0.0, 1.0];
        series.onset_times = vec![0.5, 1.0012, 1.5];
        series.onset_envelope = vec![0.8; 200];
        series.rms = vec![0.1; 20];
        series.times = (0..20).map(|i| i as f64 * 0.1).collect();

        let fused = FeatureFuser::new().fuse(&series);
        let times: Vec<f64> = fused.beats.iter().map(|b| b.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.001, 1.5]);
        assert_eq!(fused.intervals.len(), 4);
        assert!(fused.silence.intervals.is_empty());
    }
}
