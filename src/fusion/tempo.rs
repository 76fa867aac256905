use crate::fusion::types::{Beat, TempoChangeEvent, TempoChangeKind};

/// Sliding-window tempo tracking over the merged beats
///
/// Windows of `window` beats start every `hop` beats while the window fits.
/// Each window's tempo is `(len - 1) * 60 / span`. The first measured window
/// records a `Start` event; later windows record an event only when their tempo
/// differs from the last *recorded* tempo by more than `change_ratio` of it, so
/// slow drifts accumulate until they cross the threshold.
pub fn track_tempo(
    beats: &[Beat],
    window: usize,
    hop: usize,
    change_ratio: f64,
) -> Vec<TempoChangeEvent> {
    if window < 2 || hop == 0 || beats.len() < window {
        return vec![];
    }

    let mut events = Vec::new();
    let mut recorded: Option<f64> = None;

    for start in (0..=beats.len() - window).step_by(hop) {
        let slice = &beats[start..start + window];
        let (first, last) = (slice[0], slice[slice.len() - 1]);
        let span = last.time - first.time;
        if span <= 0.0 {
            continue;
        }

        let bpm = (slice.len() - 1) as f64 * 60.0 / span;
        let event = match recorded {
            None => Some((0.0, TempoChangeKind::Start)),
            Some(previous) if (bpm - previous).abs() > previous * change_ratio => {
                let kind = if bpm > previous {
                    TempoChangeKind::Increase
                } else {
                    TempoChangeKind::Decrease
                };
                Some((bpm - previous, kind))
            }
            Some(_) => None,
        };

        if let Some((delta_bpm, kind)) = event {
            tracing::trace!("Tempo {:?} at {:.3}s: {:.1} BPM", kind, first.time, bpm);
            events.push(TempoChangeEvent { time: first.time, bpm, delta_bpm, kind });
            recorded = Some(bpm);
        }
    }

    events
}

/// Latest event with `time <= at`
pub fn active_event(events: &[TempoChangeEvent], at: f64) -> Option<&TempoChangeEvent> {
    let count = events.partition_point(|event| event.time <= at);
    count.checked_sub(1).map(|index| &events[index])
}
