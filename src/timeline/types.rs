use serde::{Deserialize, Serialize};

use crate::fusion::tempo::active_event;
use crate::fusion::types::{BeatType, EnergyPeak, SilenceInterval, TempoChangeEvent};

/// A merged beat annotated with the tempo, rhythm and energy around it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBeat {
    pub time: f64,
    pub intensity: f32,

    #[serde(rename = "type")]
    pub beat_type: BeatType,

    /// Tempo of the latest tempo event at or before this beat
    pub bpm: f64,

    /// Beats per second, the reciprocal of `interval`
    pub rhythm_speed: f64,

    /// Energy of the first peak within tolerance, or the default energy
    pub energy: f32,

    /// Gap to the previous beat (mean interval for the first beat)
    pub interval: f64,
}

/// Track-level summary shipped with the timeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineStats {
    pub duration: f64,
    pub total_beats: usize,
    pub average_bpm: f64,
    pub tempo_changes: usize,
    pub energy_peaks: usize,
    pub silent_periods: usize,
    pub rhythm_consistency: f64,
    pub mean_interval: f64,
    pub energy_range: [f32; 2],
    pub silence_threshold: f32,
}

/// The exported per-beat model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub beats: Vec<EnrichedBeat>,
    pub tempo_changes: Vec<TempoChangeEvent>,
    pub energy_peaks: Vec<EnergyPeak>,

    #[serde(rename = "silent_periods")]
    pub silences: Vec<SilenceInterval>,

    pub stats: TimelineStats,
}

/// Result of [`Timeline::state_at`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioState<'a> {
    /// Beat closest to the query time
    pub beat: &'a EnrichedBeat,

    /// Tempo event active at the query time, `None` when the track has none
    pub tempo: Option<&'a TempoChangeEvent>,
}

/// Result of [`Timeline::silence_at`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SilenceState<'a> {
    Audible,
    Silent {
        interval: &'a SilenceInterval,
        /// Seconds since the interval started
        elapsed: f64,
    },
}

impl SilenceState<'_> {
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Silent { .. })
    }
}

impl Timeline {
    /// Beat nearest to `time` paired with the tempo active at `time`
    ///
    /// Ties go to the earlier beat. Before the first tempo event the first
    /// event is reported. Returns `None` for a timeline without beats.
    pub fn state_at(&self, time: f64) -> Option<AudioState<'_>> {
        let mut closest = self.beats.first()?;
        let mut best = (time - closest.time).abs();
        for beat in &self.beats[1..] {
            let distance = (time - beat.time).abs();
            if distance < best {
                best = distance;
                closest = beat;
            }
        }

        let tempo = active_event(&self.tempo_changes, time).or_else(|| self.tempo_changes.first());
        Some(AudioState { beat: closest, tempo })
    }

    /// Silence interval containing `time` (bounds inclusive), if any
    pub fn silence_at(&self, time: f64) -> SilenceState<'_> {
        self.silences
            .iter()
            .find(|interval| interval.contains(time))
            .map_or(SilenceState::Audible, |interval| SilenceState::Silent {
                interval,
                elapsed: time - interval.start,
            })
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::types::TempoChangeKind;

    fn beat(time: f64, bpm: f64) -> EnrichedBeat {
        EnrichedBeat {
            time,
            intensity: 0.8,
            beat_type: BeatType::Strong,
            bpm,
            rhythm_speed: 2.0,
            energy: 0.5,
            interval: 0.5,
        }
    }

    fn timeline() -> Timeline {
        Timeline {
            beats: vec![beat(1.0, 120.0), beat(1.5, 120.0), beat(2.0, 120.0), beat(6.0, 140.0)],
            tempo_changes: vec![
                TempoChangeEvent { time: 1.0, bpm: 120.0, delta_bpm: 0.0, kind: TempoChangeKind::Start },
                TempoChangeEvent { time: 5.0, bpm: 140.0, delta_bpm: 20.0, kind: TempoChangeKind::Increase },
            ],
            energy_peaks: vec![],
            silences: vec![SilenceInterval { start: 3.0, end: 4.5, duration: 1.5, avg_energy: 0.001 }],
            stats: TimelineStats::default(),
        }
    }

    #[test]
    fn test_state_at_picks_nearest_beat() {
        let timeline = timeline();
        assert_eq!(timeline.state_at(1.6).unwrap().beat.time, 1.5);
        assert_eq!(timeline.state_at(100.0).unwrap().beat.time, 6.0);
        // Equidistant from 1.0 and 1.5
        assert_eq!(timeline.state_at(1.25).unwrap().beat.time, 1.0);
    }

    #[test]
    fn test_state_at_tempo_lookup() {
        let timeline = timeline();
        assert_eq!(timeline.state_at(0.2).unwrap().tempo.unwrap().kind, TempoChangeKind::Start);
        assert_eq!(timeline.state_at(4.9).unwrap().tempo.unwrap().bpm, 120.0);
        assert_eq!(timeline.state_at(5.0).unwrap().tempo.unwrap().bpm, 140.0);
    }

    #[test]
    fn test_state_at_on_sparse_timelines() {
        assert!(Timeline::default().state_at(1.0).is_none());

        let mut no_tempo = timeline();
        no_tempo.tempo_changes.clear();
        let state = no_tempo.state_at(2.0).unwrap();
        assert_eq!(state.beat.time, 2.0);
        assert!(state.tempo.is_none());
    }

    #[test]
    fn test_silence_at_is_inclusive() {
        let timeline = timeline();
        assert!(!timeline.silence_at(2.99).is_silent());

        match timeline.silence_at(3.0) {
            SilenceState::Silent { interval, elapsed } => {
                assert_eq!(interval.start, 3.0);
                assert_eq!(elapsed, 0.0);
            }
            SilenceState::Audible => panic!("3.0 starts the silence"),
        }
        match timeline.silence_at(4.5) {
            SilenceState::Silent { elapsed, .. } => assert_eq!(elapsed, 1.5),
            SilenceState::Audible => panic!("4.5 ends the silence"),
        }
        assert_eq!(timeline.silence_at(4.51), SilenceState::Audible);
    }
}
