use crate::audio::types::FrameMapping;
use crate::fusion::types::{Beat, BeatType};
use crate::fusion::FusionConfig;

/// Merge two beat-candidate series into one ordered set of classified beats
///
/// Candidates are rounded to the millisecond and deduplicated, so the result
/// is strictly ascending with at least 1ms between neighbours. Intensity is
/// the onset envelope at the nearest frame divided by `envelope_max`, clamped
/// to `[config.min_intensity, 1.0]`; frames outside the envelope (or a
/// non-positive maximum, or a non-finite strength) get `config.default_intensity`.
pub fn merge_beats(
    beat_times: &[f64],
    onset_times: &[f64],
    envelope: &[f32],
    frames: &FrameMapping,
    envelope_max: f32,
    config: &FusionConfig,
) -> Vec<Beat> {
    let mut millis: Vec<i64> = beat_times
        .iter()
        .chain(onset_times)
        .filter(|t| t.is_finite() && **t >= 0.0)
        .map(|t| (t * 1000.0).round() as i64)
        .collect();
    millis.sort_unstable();
    millis.dedup();

    millis
        .into_iter()
        .map(|ms| {
            let time = ms as f64 / 1000.0;
            let intensity = intensity_at(time, envelope, frames, envelope_max, config);
            Beat {
                time,
                intensity,
                beat_type: BeatType::classify(intensity, config.strong_intensity),
            }
        })
        .collect()
}

fn intensity_at(
    time: f64,
    envelope: &[f32],
    frames: &FrameMapping,
    envelope_max: f32,
    config: &FusionConfig,
) -> f32 {
    if !(envelope_max.is_finite() && envelope_max > 0.0) {
        return config.default_intensity;
    }

    frames
        .time_to_frame(time)
        .and_then(|frame| envelope.get(frame))
        .filter(|strength| strength.is_finite())
        .map(|&strength| (strength / envelope_max).clamp(config.min_intensity, 1.0))
        .unwrap_or(config.default_intensity)
}
