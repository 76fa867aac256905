use crate::fusion::tempo::active_event;
use crate::fusion::types::EnergyPeak;
use crate::fusion::{FusedFeatures, FusionConfig};
use crate::timeline::types::{EnrichedBeat, Timeline, TimelineStats};

/// Joins fused features into the exported [`Timeline`]
pub struct TimelineSynthesizer {
    energy_tolerance: f64,
    default_energy: f32,
}

impl TimelineSynthesizer {
    pub fn new(config: &FusionConfig) -> Self {
        Self {
            energy_tolerance: config.energy_tolerance,
            default_energy: config.default_beat_energy,
        }
    }

    pub fn synthesize(&self, fused: FusedFeatures) -> Timeline {
        let average_bpm = average_bpm(fused.beats.len(), fused.duration);
        let mean_interval = fused.rhythm.mean_interval;

        let beats: Vec<EnrichedBeat> = fused
            .beats
            .iter()
            .enumerate()
            .map(|(i, beat)| {
                let interval = match i {
                    0 => mean_interval,
                    _ => fused.intervals[i - 1],
                };
                let bpm = active_event(&fused.tempo_changes, beat.time)
                    .map_or(average_bpm, |event| event.bpm);

                EnrichedBeat {
                    time: beat.time,
                    intensity: beat.intensity,
                    beat_type: beat.beat_type,
                    bpm,
                    rhythm_speed: if interval > 0.0 { 1.0 / interval } else { 0.0 },
                    energy: self.energy_near(&fused.energy_peaks, beat.time),
                    interval,
                }
            })
            .collect();

        let (energy_min, energy_max) = fused.energy_range;
        let stats = TimelineStats {
            duration: fused.duration,
            total_beats: beats.len(),
            average_bpm,
            tempo_changes: fused.tempo_changes.len(),
            energy_peaks: fused.energy_peaks.len(),
            silent_periods: fused.silence.intervals.len(),
            rhythm_consistency: fused.rhythm.consistency,
            mean_interval,
            energy_range: [energy_min, energy_max],
            silence_threshold: fused.silence.threshold,
        };

        Timeline {
            beats,
            tempo_changes: fused.tempo_changes,
            energy_peaks: fused.energy_peaks,
            silences: fused.silence.intervals,
            stats,
        }
    }

    /// First peak in scan order within tolerance, not the nearest overall
    fn energy_near(&self, peaks: &[EnergyPeak], time: f64) -> f32 {
        peaks
            .iter()
            .find(|peak| (peak.time - time).abs() < self.energy_tolerance)
            .map_or(self.default_energy, |peak| peak.energy)
    }
}

/// Beats per minute over the whole track, 0 for a zero-length track
pub fn average_bpm(beat_count: usize, duration: f64) -> f64 {
    if duration > 0.0 {
        beat_count as f64 * 60.0 / duration
    } else {
        0.0
    }
}
