use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw decoded audio with metadata
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples (interleaved for stereo, mono for single channel)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Duration in seconds
    pub duration: f64,

    /// Original file path
    pub file_path: PathBuf,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioData {
    /// Get mono mix of all channels
    pub fn mono_samples(&self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples.clone();
        }

        self.samples
            .chunks(self.channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    }

    /// File name shown in the generated script header
    pub fn identifier(&self) -> String {
        self.file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.display().to_string())
    }
}

/// Audio file format information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFormat {
    /// File extension (wav, mp3, flac, etc.)
    pub extension: String,

    /// Bit depth (16, 24, 32, etc.)
    pub bit_depth: Option<u16>,

    /// Codec description for compressed formats
    pub compression: Option<String>,
}

/// Maps times in seconds to analysis frame indices and back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMapping {
    pub sample_rate: u32,
    pub hop_size: usize,
}

impl FrameMapping {
    pub fn new(sample_rate: u32, hop_size: usize) -> Self {
        Self { sample_rate, hop_size }
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f64 {
        if self.hop_size == 0 {
            return 0.0;
        }
        self.sample_rate as f64 / self.hop_size as f64
    }

    /// Nearest frame index for a time, `None` for negative or non-finite times
    pub fn time_to_frame(&self, time: f64) -> Option<usize> {
        let frame = (time * self.frame_rate()).round();
        if frame.is_finite() && frame >= 0.0 {
            Some(frame as usize)
        } else {
            None
        }
    }

    pub fn frame_to_time(&self, frame: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (frame * self.hop_size) as f64 / self.sample_rate as f64
    }
}

/// The time-indexed series a spectral front-end hands to the fusion stages
#[derive(Debug, Clone)]
pub struct FeatureSeries {
    /// Primary beat-tracking estimate (seconds, ascending)
    pub beat_times: Vec<f64>,

    /// Independent onset estimate (seconds, ascending)
    pub onset_times: Vec<f64>,

    /// Onset strength per analysis frame
    pub onset_envelope: Vec<f32>,

    /// Time to frame mapping for `onset_envelope`
    pub frames: FrameMapping,

    /// RMS energy per analysis frame
    pub rms: Vec<f32>,

    /// Frame times matching `rms`
    pub times: Vec<f64>,

    /// Spectral centroid per frame (Hz)
    pub spectral_centroid: Vec<f32>,

    /// 85% spectral rolloff per frame (Hz)
    pub spectral_rolloff: Vec<f32>,

    /// Track duration in seconds
    pub duration: f64,

    pub sample_rate: u32,
}

impl FeatureSeries {
    /// Series with no detected content, used for audio shorter than one window
    pub fn empty(duration: f64, frames: FrameMapping) -> Self {
        Self {
            beat_times: vec![],
            onset_times: vec![],
            onset_envelope: vec![],
            frames,
            rms: vec![],
            times: vec![],
            spectral_centroid: vec![],
            spectral_rolloff: vec![],
            duration,
            sample_rate: frames.sample_rate,
        }
    }

    /// Global maximum of the onset envelope (0.0 when empty)
    pub fn envelope_max(&self) -> f32 {
        self.onset_envelope.iter().copied().fold(0.0f32, f32::max)
    }
}

/// Configuration for the spectral front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Window size for FFT analysis
    pub window_size: usize,

    /// Hop size between analysis frames
    pub hop_size: usize,

    /// Minimum BPM the beat tracker considers
    pub min_bpm: f32,

    /// Maximum BPM the beat tracker considers
    pub max_bpm: f32,

    /// Onset picking sensitivity (0.0-1.0)
    pub onset_sensitivity: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 2048,
            hop_size: 512,
            min_bpm: 60.0,
            max_bpm: 200.0,
            onset_sensitivity: 0.7,
        }
    }
}

impl AnalysisConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.window_size == 0 || !self.window_size.is_power_of_two() {
            return Err("Window size must be a power of two".to_string());
        }

        if self.hop_size == 0 || self.hop_size > self.window_size {
            return Err("Hop size must be between 1 and the window size".to_string());
        }

        if self.min_bpm <= 0.0 || self.min_bpm >= self.max_bpm {
            return Err("Minimum BPM must be positive and less than maximum BPM".to_string());
        }

        if !(0.0..=1.0).contains(&self.onset_sensitivity) {
            return Err("Onset sensitivity must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(samples: Vec<f32>, channels: u16) -> AudioData {
        AudioData {
            samples,
            sample_rate: 22050,
            channels,
            duration: 1.0,
            file_path: PathBuf::from("music/track.mp3"),
            format: AudioFormat {
                extension: "mp3".to_string(),
                bit_depth: None,
                compression: None,
            },
        }
    }

    #[test]
    fn test_audio_data_mono_conversion() {
        let audio_data = audio(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2);
        assert_eq!(audio_data.mono_samples(), vec![1.5, 3.5, 5.5]);
    }

    #[test]
    fn test_identifier_is_file_name() {
        assert_eq!(audio(vec![], 1).identifier(), "track.mp3");
    }

    #[test]
    fn test_frame_mapping_nearest_frame() {
        let frames = FrameMapping::new(22050, 512);
        assert_eq!(frames.time_to_frame(0.0), Some(0));
        // 1s = 43.07 frames
        assert_eq!(frames.time_to_frame(1.0), Some(43));
        assert_eq!(frames.time_to_frame(-0.5), None);
        assert!((frames.frame_to_time(43) - 43.0 * 512.0 / 22050.0).abs() < 1e-12);
    }

    #[test]
    fn test_analysis_config_validation() {
        assert!(AnalysisConfig::default().validate().is_ok());

        let invalid = AnalysisConfig {
            window_size: 1000,
            ..Default::default()
        };
        assert!(invalid.validate().unwrap_err().contains("power of two"));

        let inverted = AnalysisConfig {
            min_bpm: 180.0,
            max_bpm: 90.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }
}
