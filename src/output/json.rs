use crate::error::{EmitError, Result};
use crate::timeline::Timeline;

/// Pretty-printed JSON form of the timeline
pub fn to_json(timeline: &Timeline) -> Result<String> {
    serde_json::to_string_pretty(timeline)
        .map_err(|e| EmitError::SerializeFailed { reason: e.to_string() }.into())
}

/// Parse a timeline previously written by [`to_json`]
pub fn from_json(json: &str) -> Result<Timeline> {
    serde_json::from_str(json)
        .map_err(|e| EmitError::SerializeFailed { reason: e.to_string() }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::types::{BeatType, EnergyPeak, SilenceInterval, TempoChangeEvent, TempoChangeKind};
    use crate::timeline::{EnrichedBeat, TimelineStats};

    fn sample_timeline() -> Timeline {
        Timeline {
            beats: vec![EnrichedBeat {
                time: 0.5,
                intensity: 0.75,
                beat_type: BeatType::Strong,
                bpm: 120.0,
                rhythm_speed: 2.0,
                energy: 0.31,
                interval: 0.5,
            }],
            tempo_changes: vec![TempoChangeEvent {
                time: 0.5,
                bpm: 120.0,
                delta_bpm: 0.0,
                kind: TempoChangeKind::Start,
            }],
            energy_peaks: vec![EnergyPeak { time: 0.512, energy: 0.31 }],
            silences: vec![SilenceInterval { start: 3.0, end: 4.0, duration: 1.0, avg_energy: 0.0004 }],
            stats: TimelineStats {
                duration: 5.0,
                total_beats: 1,
                average_bpm: 12.0,
                tempo_changes: 1,
                energy_peaks: 1,
                silent_periods: 1,
                rhythm_consistency: 0.0,
                mean_interval: 0.0,
                energy_range: [0.0001, 0.31],
                silence_threshold: 0.005,
            },
        }
    }

    #[test]
    fn test_json_uses_published_key_names() {
        let json = to_json(&sample_timeline()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["beats"][0]["type"], "strong");
        assert_eq!(value["tempo_changes"][0]["type"], "start");
        assert_eq!(value["tempo_changes"][0]["change"], 0.0);
        assert_eq!(value["silent_periods"][0]["avg_energy"].as_f64().unwrap() as f32, 0.0004);
        assert_eq!(value["stats"]["total_beats"], 1);
        assert_eq!(value["stats"]["energy_range"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_json_round_trip() {
        let timeline = sample_timeline();
        let parsed = from_json(&to_json(&timeline).unwrap()).unwrap();
        assert_eq!(parsed, timeline);
    }

    #[test]
    fn test_empty_timeline_serializes() {
        let json = to_json(&Timeline::default()).unwrap();
        assert_eq!(from_json(&json).unwrap(), Timeline::default());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(from_json("{\"beats\": 3}").is_err());
    }
}
