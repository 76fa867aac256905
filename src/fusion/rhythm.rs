use crate::fusion::types::{Beat, RhythmStats};

/// Consecutive inter-beat intervals (`len - 1` values)
pub fn intervals(beats: &[Beat]) -> Vec<f64> {
    beats.windows(2).map(|pair| pair[1].time - pair[0].time).collect()
}

impl RhythmStats {
    /// Statistics over all intervals, no outlier rejection
    ///
    /// Fewer than one interval (i.e. fewer than two beats) yields all zeros.
    pub fn from_intervals(intervals: &[f64]) -> Self {
        if intervals.is_empty() {
            return Self::default();
        }

        let count = intervals.len() as f64;
        let mean_interval = intervals.iter().sum::<f64>() / count;
        let variance = intervals
            .iter()
            .map(|interval| (interval - mean_interval).powi(2))
            .sum::<f64>()
            / count;
        let std_interval = variance.sqrt();

        let consistency = if mean_interval > 0.0 {
            1.0 - std_interval / mean_interval
        } else {
            0.0
        };

        Self {
            mean_interval,
            std_interval,
            consistency,
            interval_min: intervals.iter().copied().fold(f64::INFINITY, f64::min),
            interval_max: intervals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
