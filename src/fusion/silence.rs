use crate::fusion::energy::mean;
use crate::fusion::types::SilenceInterval;

/// Silence intervals together with the threshold that produced them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SilenceMap {
    /// RMS at or below this counts as silent
    pub threshold: f32,
    pub intervals: Vec<SilenceInterval>,
}

/// Segment sustained low-energy runs of `rms` into silence intervals
///
/// The threshold is `silence_ratio` times the mean RMS. A run starts at the
/// first sample at or below the threshold and ends at the next sample above
/// it; runs shorter than `min_duration` are dropped. A run still open at the
/// end of the series is closed at `duration`.
pub fn detect_silence(
    rms: &[f32],
    times: &[f64],
    duration: f64,
    silence_ratio: f32,
    min_duration: f64,
) -> SilenceMap {
    let len = rms.len().min(times.len());
    let rms = &rms[..len];
    let threshold = mean(rms) * silence_ratio;

    let mut intervals = Vec::new();
    // (sample index, time) where the current silent run started
    let mut open: Option<(usize, f64)> = None;

    for (index, (&energy, &time)) in rms.iter().zip(times).enumerate() {
        let silent = energy <= threshold;
        match open {
            None if silent => open = Some((index, time)),
            Some((start_index, start)) if !silent => {
                if let Some(interval) = close(rms, start_index, index, start, time, min_duration) {
                    intervals.push(interval);
                }
                open = None;
            }
            _ => {}
        }
    }

    if let Some((start_index, start)) = open {
        if let Some(interval) = close(rms, start_index, len, start, duration, min_duration) {
            intervals.push(interval);
        }
    }

    tracing::debug!(
        "Silence threshold {:.4}: {} intervals",
        threshold,
        intervals.len()
    );

    SilenceMap { threshold, intervals }
}

fn close(
    rms: &[f32],
    start_index: usize,
    end_index: usize,
    start: f64,
    end: f64,
    min_duration: f64,
) -> Option<SilenceInterval> {
    let duration = end - start;
    (duration > 0.0 && duration >= min_duration).then(|| SilenceInterval {
        start,
        end,
        duration,
        avg_energy: mean(&rms[start_index..end_index]),
    })
}
