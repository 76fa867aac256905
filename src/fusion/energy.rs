use crate::fusion::types::{BrightnessSummary, EnergyPeak};

/// Arithmetic mean, 0.0 for an empty series
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// `(min, max)` of a series, `(0.0, 0.0)` when empty
pub fn range(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Interior local maxima of `rms` above `peak_ratio` times the series mean
///
/// `rms` and `times` are paired index by index; any excess in the longer one
/// is ignored.
pub fn detect_energy_peaks(rms: &[f32], times: &[f64], peak_ratio: f32) -> Vec<EnergyPeak> {
    let len = rms.len().min(times.len());
    if len < 3 {
        return vec![];
    }

    let rms = &rms[..len];
    let threshold = mean(rms) * peak_ratio;

    (1..len - 1)
        .filter(|&i| rms[i] > rms[i - 1] && rms[i] > rms[i + 1] && rms[i] > threshold)
        .map(|i| EnergyPeak { time: times[i], energy: rms[i] })
        .collect()
}

impl BrightnessSummary {
    /// Mean/min/max spectral centroid plus mean rolloff
    pub fn from_series(centroid: &[f32], rolloff: &[f32]) -> Self {
        let (min, max) = range(centroid);
        Self {
            mean: mean(centroid),
            min,
            max,
            mean_rolloff: mean(rolloff),
        }
    }
}
