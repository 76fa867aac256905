use realfft::RealFftPlanner;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::audio::types::{AnalysisConfig, AudioData, FeatureSeries, FrameMapping};
use crate::error::{AudioError, Result};

/// Fraction of spectral energy below the rolloff frequency
const ROLLOFF_FRACTION: f32 = 0.85;

/// Half-width, in frames, of the onset peak-picking neighbourhood
const ONSET_NEIGHBOURHOOD: usize = 3;

/// Per-frame spectral measurements for one track
#[derive(Debug, Default)]
struct SpectralFrames {
    rms: Vec<f32>,
    centroid: Vec<f32>,
    rolloff: Vec<f32>,
    flux: Vec<f32>,
}

/// STFT-based front-end producing the series consumed by the fusion stages
pub struct FeatureExtractor {
    config: AnalysisConfig,
}

impl FeatureExtractor {
    /// Create a new extractor with default configuration
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    /// Create a new extractor with custom configuration
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Extract beat, onset, energy and brightness series from decoded audio
    pub fn extract(&self, audio: &AudioData) -> Result<FeatureSeries> {
        self.config
            .validate()
            .map_err(|details| AudioError::InvalidParameters { details })?;

        let frames = FrameMapping::new(audio.sample_rate, self.config.hop_size);
        let mono = audio.mono_samples();

        if mono.len() < self.config.window_size {
            tracing::warn!(
                "Audio is shorter than one analysis window ({} < {} samples), no features extracted",
                mono.len(),
                self.config.window_size
            );
            return Ok(FeatureSeries::empty(audio.duration, frames));
        }

        tracing::debug!("Computing spectral frames...");
        let spectral = self.spectral_frames(&mono, audio.sample_rate)?;

        tracing::debug!("Picking onsets...");
        let onset_times: Vec<f64> = self
            .pick_onsets(&spectral.flux)
            .into_iter()
            .map(|frame| frames.frame_to_time(frame))
            .collect();

        tracing::debug!("Tracking beats...");
        let beat_times: Vec<f64> = self
            .track_beats(&spectral.flux, frames.frame_rate())
            .into_iter()
            .map(|frame| frames.frame_to_time(frame))
            .collect();

        let times = (0..spectral.rms.len()).map(|frame| frames.frame_to_time(frame)).collect();

        tracing::debug!(
            "Front-end: {} frames, {} onsets, {} tracked beats",
            spectral.rms.len(),
            onset_times.len(),
            beat_times.len()
        );

        Ok(FeatureSeries {
            beat_times,
            onset_times,
            onset_envelope: spectral.flux,
            frames,
            rms: spectral.rms,
            times,
            spectral_centroid: spectral.centroid,
            spectral_rolloff: spectral.rolloff,
            duration: audio.duration,
            sample_rate: audio.sample_rate,
        })
    }

    /// Hann-windowed STFT yielding RMS, centroid, rolloff and log spectral flux per frame
    fn spectral_frames(&self, samples: &[f32], sample_rate: u32) -> Result<SpectralFrames> {
        let window_size = self.config.window_size;
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(window_size);
        let mut input = fft.make_input_vec();
        let mut spectrum = fft.make_output_vec();

        let hann: Vec<f32> = (0..window_size)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (window_size - 1) as f32).cos())
            })
            .collect();
        let bin_hz = sample_rate as f32 / window_size as f32;

        let mut out = SpectralFrames::default();
        let mut previous: Option<Vec<f32>> = None;

        for window in samples.windows(window_size).step_by(self.config.hop_size) {
            let rms = (window.iter().map(|&x| x * x).sum::<f32>() / window.len() as f32).sqrt();
            out.rms.push(rms);

            for ((slot, &sample), &w) in input.iter_mut().zip(window).zip(&hann) {
                *slot = sample * w;
            }

            fft.process(&mut input, &mut spectrum)
                .map_err(|e| AudioError::AnalysisFailed {
                    reason: format!("FFT processing failed: {}", e),
                })?;

            let magnitude: Vec<f32> = spectrum.iter().map(|c| c.norm()).collect();
            let total: f32 = magnitude.iter().sum();

            let centroid = if total > 0.0 {
                magnitude
                    .iter()
                    .enumerate()
                    .map(|(bin, &mag)| bin as f32 * bin_hz * mag)
                    .sum::<f32>()
                    / total
            } else {
                0.0
            };
            out.centroid.push(centroid);

            let target = total * ROLLOFF_FRACTION;
            let mut cumulative = 0.0;
            let rolloff_bin = magnitude
                .iter()
                .position(|&mag| {
                    cumulative += mag;
                    cumulative >= target
                })
                .unwrap_or(0);
            out.rolloff.push(rolloff_bin as f32 * bin_hz);

            let flux = match &previous {
                Some(prev) => magnitude
                    .iter()
                    .zip(prev)
                    .map(|(&curr, &prev)| (curr.ln_1p() - prev.ln_1p()).max(0.0))
                    .sum(),
                None => 0.0,
            };
            out.flux.push(flux);
            previous = Some(magnitude);
        }

        Ok(out)
    }

    /// Local maxima of the onset envelope above an adaptive neighbourhood threshold
    fn pick_onsets(&self, envelope: &[f32]) -> Vec<usize> {
        let mut onsets = Vec::new();
        let mut last_onset: Option<usize> = None;

        for (i, &value) in envelope.iter().enumerate() {
            if value <= 0.0 {
                continue;
            }

            let start = i.saturating_sub(ONSET_NEIGHBOURHOOD);
            let end = (i + ONSET_NEIGHBOURHOOD + 1).min(envelope.len());
            let neighbourhood = &envelope[start..end];

            let local_max = neighbourhood.iter().copied().fold(0.0f32, f32::max);
            let local_mean = neighbourhood.iter().sum::<f32>() / neighbourhood.len() as f32;
            let threshold =
                local_mean + self.config.onset_sensitivity * (local_max - local_mean) * 0.5;

            let spaced = last_onset.map_or(true, |last| i - last > ONSET_NEIGHBOURHOOD);
            if value >= threshold && value == local_max && value > local_mean * 1.5 && spaced {
                onsets.push(i);
                last_onset = Some(i);
            }
        }

        onsets
    }

    /// Beat grid at the dominant envelope period, snapped to local envelope maxima
    fn track_beats(&self, envelope: &[f32], frame_rate: f64) -> Vec<usize> {
        let Some(period) = self.estimate_period(envelope, frame_rate) else {
            tracing::debug!("No dominant periodicity in onset envelope, no beats tracked");
            return vec![];
        };
        tracing::debug!(
            "Beat period: {} frames ({:.1} BPM)",
            period,
            60.0 * frame_rate / period as f64
        );

        let argmax = |range: std::ops::Range<usize>| -> usize {
            let offset = range.start;
            envelope[range]
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(i, _)| offset + i)
                .unwrap_or(offset)
        };

        let tolerance = (period / 10).max(1);
        let mut beats = Vec::new();
        let mut position = argmax(0..period.min(envelope.len()));

        while position < envelope.len() {
            let start = position.saturating_sub(tolerance);
            let end = (position + tolerance + 1).min(envelope.len());
            let chosen = argmax(start..end);
            if envelope[chosen] > 0.0 && beats.last().map_or(true, |&last| chosen > last) {
                beats.push(chosen);
            }
            position = chosen.max(position) + period;
        }

        beats
    }

    /// Dominant lag (in frames) of the envelope autocorrelation within the BPM range
    fn estimate_period(&self, envelope: &[f32], frame_rate: f64) -> Option<usize> {
        let min_lag = (60.0 / self.config.max_bpm as f64 * frame_rate).round() as usize;
        let max_lag = (60.0 / self.config.min_bpm as f64 * frame_rate).round() as usize;
        let acf = autocorrelation(envelope);

        if min_lag == 0 || min_lag >= max_lag || max_lag >= acf.len() {
            return None;
        }

        let (offset, &peak) = acf[min_lag..=max_lag]
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))?;

        (peak > 0.0).then_some(min_lag + offset)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean-removed linear autocorrelation via FFT (Wiener-Khinchin)
fn autocorrelation(signal: &[f32]) -> Vec<f32> {
    if signal.is_empty() {
        return vec![];
    }

    let mean = signal.iter().sum::<f32>() / signal.len() as f32;
    let fft_len = (signal.len() * 2).next_power_of_two();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_len);
    let ifft = planner.plan_fft_inverse(fft_len);

    let mut buffer: Vec<Complex<f32>> = signal
        .iter()
        .map(|&s| Complex::new(s - mean, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(fft_len)
        .collect();

    fft.process(&mut buffer);
    for c in buffer.iter_mut() {
        *c = Complex::new(c.norm_sqr(), 0.0);
    }
    ifft.process(&mut buffer);

    let scale = 1.0 / fft_len as f32;
    buffer.iter().take(signal.len()).map(|c| c.re * scale).collect()
}
