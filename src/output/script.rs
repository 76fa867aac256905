use std::fmt::{self, Write};

use crate::error::{EmitError, Result};
use crate::fusion::types::{BeatType, TempoChangeKind};
use crate::timeline::Timeline;

const LOOKUP_FUNCTIONS: &str = r#"// Current audio state for a playback time
function getCurrentAudioState(currentTime) {
    if (timingMap.length === 0) {
        return null;
    }

    // Find closest beat
    let closestBeat = timingMap[0];
    let minDistance = Math.abs(currentTime - closestBeat.time);

    for (let beat of timingMap) {
        const distance = Math.abs(currentTime - beat.time);
        if (distance < minDistance) {
            minDistance = distance;
            closestBeat = beat;
        }
    }

    // Find current tempo
    let currentTempo = tempoChanges[0];
    for (let tempo of tempoChanges) {
        if (tempo.time <= currentTime) {
            currentTempo = tempo;
        } else {
            break;
        }
    }

    return {
        intensity: closestBeat.intensity,
        bpm: closestBeat.bpm,
        rhythmSpeed: closestBeat.rhythm_speed,
        energy: closestBeat.energy,
        interval: closestBeat.interval,
        tempoChange: currentTempo
    };
}

// Whether a playback time falls inside a silent period
function isInSilentPeriod(currentTime) {
    for (let period of silentPeriods) {
        if (currentTime >= period.start && currentTime <= period.end) {
            return {
                isSilent: true,
                period: period,
                timeInSilence: currentTime - period.start
            };
        }
    }
    return { isSilent: false };
}

function getSilenceInfo(currentTime) {
    return isInSilentPeriod(currentTime);
}

console.log("Audio analysis loaded:", audioStats);
"#;

fn beat_label(beat_type: BeatType) -> &'static str {
    match beat_type {
        BeatType::Strong => "strong",
        BeatType::Weak => "weak",
    }
}

fn tempo_label(kind: TempoChangeKind) -> &'static str {
    match kind {
        TempoChangeKind::Start => "start",
        TempoChangeKind::Increase => "increase",
        TempoChangeKind::Decrease => "decrease",
    }
}

/// Write `const name = [ ... ];` with one entry per line
fn write_array<I>(out: &mut String, name: &str, entries: I) -> fmt::Result
where
    I: IntoIterator<Item = String>,
{
    let lines: Vec<String> = entries.into_iter().map(|entry| format!("    {}", entry)).collect();
    writeln!(out, "const {} = [", name)?;
    if !lines.is_empty() {
        writeln!(out, "{}", lines.join(",\n"))?;
    }
    writeln!(out, "];\n")
}

/// Render the timeline as a self-contained JavaScript module
///
/// Numbers use fixed precision: times and energies 3 decimals, tempo 1,
/// rhythm speed 2, silence energy and threshold 4.
pub fn render(timeline: &Timeline, source: &str) -> Result<String> {
    let mut out = String::new();
    write_script(&mut out, timeline, source).map_err(|e| EmitError::SerializeFailed {
        reason: format!("script rendering failed: {}", e),
    })?;
    Ok(out)
}

fn write_script(out: &mut String, timeline: &Timeline, source: &str) -> fmt::Result {
    let stats = &timeline.stats;

    writeln!(out, "// AUDIO ANALYSIS RESULTS: {}", source)?;
    writeln!(
        out,
        "// Duration: {:.2}s | Beats: {} | Tempo Changes: {}",
        stats.duration, stats.total_beats, stats.tempo_changes
    )?;
    writeln!(
        out,
        "// Average BPM: {:.1} | Rhythm Consistency: {:.2}\n",
        stats.average_bpm, stats.rhythm_consistency
    )?;

    write_array(
        out,
        "timingMap",
        timeline.beats.iter().map(|beat| {
            format!(
                "{{ time: {:.3}, intensity: {:.3}, type: '{}', bpm: {:.1}, rhythm_speed: {:.2}, energy: {:.3}, interval: {:.3} }}",
                beat.time,
                beat.intensity,
                beat_label(beat.beat_type),
                beat.bpm,
                beat.rhythm_speed,
                beat.energy,
                beat.interval
            )
        }),
    )?;

    writeln!(out, "// Tempo changes throughout the track")?;
    write_array(
        out,
        "tempoChanges",
        timeline.tempo_changes.iter().map(|change| {
            format!(
                "{{ time: {:.3}, bpm: {:.1}, change: {:.1}, type: '{}' }}",
                change.time,
                change.bpm,
                change.delta_bpm,
                tempo_label(change.kind)
            )
        }),
    )?;

    writeln!(out, "// Energy peaks")?;
    write_array(
        out,
        "energyPeaks",
        timeline
            .energy_peaks
            .iter()
            .map(|peak| format!("{{ time: {:.3}, energy: {:.3} }}", peak.time, peak.energy)),
    )?;

    writeln!(out, "// Silent periods (no music playing)")?;
    write_array(
        out,
        "silentPeriods",
        timeline.silences.iter().map(|period| {
            format!(
                "{{ start: {:.3}, end: {:.3}, duration: {:.3}, avgEnergy: {:.4} }}",
                period.start, period.end, period.duration, period.avg_energy
            )
        }),
    )?;

    writeln!(out, "// Analysis statistics")?;
    writeln!(out, "const audioStats = {{")?;
    writeln!(out, "    duration: {:.2},", stats.duration)?;
    writeln!(out, "    totalBeats: {},", stats.total_beats)?;
    writeln!(out, "    averageBPM: {:.1},", stats.average_bpm)?;
    writeln!(out, "    tempoChanges: {},", stats.tempo_changes)?;
    writeln!(out, "    energyPeaks: {},", stats.energy_peaks)?;
    writeln!(out, "    silentPeriods: {},", stats.silent_periods)?;
    writeln!(out, "    rhythmConsistency: {:.2},", stats.rhythm_consistency)?;
    writeln!(out, "    meanInterval: {:.3},", stats.mean_interval)?;
    writeln!(
        out,
        "    energyRange: [{:.3}, {:.3}],",
        stats.energy_range[0], stats.energy_range[1]
    )?;
    writeln!(out, "    silenceThreshold: {:.4}", stats.silence_threshold)?;
    writeln!(out, "}};\n")?;

    out.push_str(LOOKUP_FUNCTIONS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::types::{EnergyPeak, SilenceInterval, TempoChangeEvent};
    use crate::timeline::{EnrichedBeat, TimelineStats};

    fn timeline() -> Timeline {
        Timeline {
            beats: vec![
                EnrichedBeat {
                    time: 0.5,
                    intensity: 0.8,
                    beat_type: BeatType::Strong,
                    bpm: 120.0,
                    rhythm_speed: 2.0,
                    energy: 0.25,
                    interval: 0.5,
                },
                EnrichedBeat {
                    time: 1.0,
                    intensity: 0.4,
                    beat_type: BeatType::Weak,
                    bpm: 120.0,
                    rhythm_speed: 2.0,
                    energy: 0.5,
                    interval: 0.5,
                },
            ],
            tempo_changes: vec![TempoChangeEvent {
                time: 0.5,
                bpm: 120.0,
                delta_bpm: 0.0,
                kind: TempoChangeKind::Start,
            }],
            energy_peaks: vec![EnergyPeak { time: 0.51, energy: 0.25 }],
            silences: vec![SilenceInterval { start: 2.0, end: 3.0, duration: 1.0, avg_energy: 0.0005 }],
            stats: TimelineStats {
                duration: 4.0,
                total_beats: 2,
                average_bpm: 30.0,
                tempo_changes: 1,
                energy_peaks: 1,
                silent_periods: 1,
                rhythm_consistency: 1.0,
                mean_interval: 0.5,
                energy_range: [0.0001, 0.25],
                silence_threshold: 0.005,
            },
        }
    }

    #[test]
    fn test_render_declares_all_tables_and_lookups() {
        let script = render(&timeline(), "song.mp3").unwrap();

        for declaration in [
            "const timingMap = [",
            "const tempoChanges = [",
            "const energyPeaks = [",
            "const silentPeriods = [",
            "const audioStats = {",
            "function getCurrentAudioState(currentTime)",
            "function isInSilentPeriod(currentTime)",
            "function getSilenceInfo(currentTime)",
        ] {
            assert!(script.contains(declaration), "missing {}", declaration);
        }
        assert!(script.starts_with("// AUDIO ANALYSIS RESULTS: song.mp3"));
    }

    #[test]
    fn test_render_uses_fixed_precision() {
        let script = render(&timeline(), "song.mp3").unwrap();

        assert!(script.contains(
            "    { time: 0.500, intensity: 0.800, type: 'strong', bpm: 120.0, rhythm_speed: 2.00, energy: 0.250, interval: 0.500 },\n"
        ));
        assert!(script.contains("type: 'weak'"));
        assert!(script.contains("{ time: 0.500, bpm: 120.0, change: 0.0, type: 'start' }"));
        assert!(script.contains("{ time: 0.510, energy: 0.250 }"));
        assert!(script.contains("{ start: 2.000, end: 3.000, duration: 1.000, avgEnergy: 0.0005 }"));
        assert!(script.contains("    energyRange: [0.000, 0.250],"));
        assert!(script.contains("    silenceThreshold: 0.0050\n"));
    }

    #[test]
    fn test_render_empty_timeline() {
        let script = render(&Timeline::default(), "empty.wav").unwrap();
        assert!(script.contains("const timingMap = [\n];"));
        assert!(script.contains("totalBeats: 0,"));
        assert!(script.contains("if (timingMap.length === 0)"));
    }
}
