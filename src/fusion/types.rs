use serde::{Deserialize, Serialize};

/// Strong/weak classification of a merged beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeatType {
    Strong,
    Weak,
}

impl BeatType {
    /// Strong iff `intensity` is above `strong_threshold`
    pub fn classify(intensity: f32, strong_threshold: f32) -> Self {
        if intensity > strong_threshold {
            Self::Strong
        } else {
            Self::Weak
        }
    }
}

/// A deduplicated beat with its normalized onset intensity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    /// Time of the beat in seconds
    pub time: f64,

    /// Onset strength normalized to the track maximum, clamped to [0.1, 1.0]
    pub intensity: f32,

    #[serde(rename = "type")]
    pub beat_type: BeatType,
}

/// Direction of a recorded tempo change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempoChangeKind {
    /// First measured tempo of the track
    Start,
    Increase,
    Decrease,
}

/// Point where the local tempo moved away from the last recorded tempo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChangeEvent {
    /// Time of the first beat in the window that produced this tempo
    pub time: f64,

    pub bpm: f64,

    /// Signed difference to the previously recorded tempo (0 for `Start`)
    #[serde(rename = "change")]
    pub delta_bpm: f64,

    #[serde(rename = "type")]
    pub kind: TempoChangeKind,
}

/// Inter-beat interval statistics over the whole track
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RhythmStats {
    pub mean_interval: f64,

    /// Population standard deviation of the intervals
    pub std_interval: f64,

    /// `1 - std/mean`; 1.0 is perfectly regular, negative for very irregular rhythms
    pub consistency: f64,

    pub interval_min: f64,
    pub interval_max: f64,
}

/// Local RMS maximum well above the track's average energy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyPeak {
    pub time: f64,
    pub energy: f32,
}

/// Brightness report derived from the spectral series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BrightnessSummary {
    /// Mean spectral centroid (Hz)
    pub mean: f32,
    pub min: f32,
    pub max: f32,

    /// Mean 85% spectral rolloff (Hz)
    pub mean_rolloff: f32,
}

/// Sustained low-energy span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilenceInterval {
    pub start: f64,
    pub end: f64,
    pub duration: f64,

    /// Mean RMS of the samples inside the interval
    pub avg_energy: f32,
}

impl SilenceInterval {
    /// Inclusive on both ends
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }
}
