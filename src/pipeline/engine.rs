use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{
    audio::{AudioLoader, FeatureExtractor, FeatureSeries},
    config::Config,
    error::Result,
    fusion::{BrightnessSummary, FeatureFuser, RhythmStats, SilenceInterval},
    output::{json, script, write_atomically, DocumentPatcher},
    timeline::{Timeline, TimelineSynthesizer},
};

/// Files written by one run
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub script: PathBuf,
    pub json: PathBuf,

    /// `None` when patching was disabled or the document does not exist
    pub document: Option<PathBuf>,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// File name of the analyzed audio, used in the script header
    pub source: String,

    /// Audio path written into the presentation document
    pub audio_reference: String,

    pub timeline: Timeline,
    pub rhythm: RhythmStats,
    pub brightness: BrightnessSummary,
    pub artifacts: ArtifactPaths,
}

/// Main analysis engine that turns one audio file into timeline artifacts
///
/// The engine follows a clear pipeline:
/// 1. Audio Loading - Decode the input into PCM samples
/// 2. Feature Extraction - Beat, onset, energy and brightness series
/// 3. Feature Fusion - Beats, tempo changes, rhythm, energy peaks, silence
/// 4. Timeline Synthesis - Per-beat enriched timeline and summary stats
/// 5. Emission - JavaScript module, JSON and the presentation document
pub struct AnalysisEngine {
    config: Config,
    patcher: DocumentPatcher,
}

impl AnalysisEngine {
    /// Create a new engine, rejecting invalid configuration up front
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            patcher: DocumentPatcher::new()?,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Main analysis method - orchestrates the entire pipeline
    ///
    /// Nothing is written unless analysis succeeds. An emission failure
    /// leaves earlier artifacts of the same run in place.
    pub async fn run<P: AsRef<Path>>(&self, audio_path: P) -> Result<AnalysisReport> {
        let audio_path = audio_path.as_ref();

        info!("🎵 Starting rhythm timeline analysis");
        info!("   Audio: {:?}", audio_path);
        info!("   Output: {:?}", self.config.output.directory);

        // Pipeline Steps 1-2: Loading and feature extraction
        let (series, source) = self.extract_features(audio_path).await?;

        // Pipeline Steps 3-4: Fusion and synthesis
        let (timeline, rhythm, brightness) = self.analyze_series(&series);
        self.log_summary(&timeline, &rhythm, &brightness);

        // Pipeline Step 5: Emission
        let audio_reference = document_reference(audio_path, &self.config.output.document_path());
        let artifacts = self.emit(&timeline, &source, &audio_reference).await?;

        info!("✅ Analysis complete!");
        Ok(AnalysisReport {
            source,
            audio_reference,
            timeline,
            rhythm,
            brightness,
            artifacts,
        })
    }

    // ==========================================
    // PIPELINE STEPS 1-2: LOADING & EXTRACTION
    // ==========================================

    async fn extract_features(&self, audio_path: &Path) -> Result<(FeatureSeries, String)> {
        info!("🎧 Step 1: Loading audio file...");
        let audio = AudioLoader::load(audio_path).await.map_err(|e| {
            warn!("Failed to load audio file: {}", e);
            e
        })?;
        info!(
            "   Loaded: {:.1}s, {} Hz, {} channels",
            audio.duration, audio.sample_rate, audio.channels
        );

        info!("📈 Step 2: Extracting features...");
        let extractor = FeatureExtractor::with_config(self.config.analysis.clone());
        let series = extractor.extract(&audio)?;
        info!(
            "   {} frames, {} beat candidates, {} onsets",
            series.rms.len(),
            series.beat_times.len(),
            series.onset_times.len()
        );

        Ok((series, audio.identifier()))
    }

    // ==========================================
    // PIPELINE STEPS 3-4: FUSION & SYNTHESIS
    // ==========================================

    /// Fuse and synthesize without touching the filesystem
    pub fn analyze_series(&self, series: &FeatureSeries) -> (Timeline, RhythmStats, BrightnessSummary) {
        info!("🧩 Step 3: Fusing features...");
        let fuser = FeatureFuser::with_config(self.config.fusion.clone());
        let fused = fuser.fuse(series);
        let rhythm = fused.rhythm;
        let brightness = fused.brightness;

        info!("🗺️  Step 4: Synthesizing timeline...");
        let timeline = TimelineSynthesizer::new(&self.config.fusion).synthesize(fused);
        (timeline, rhythm, brightness)
    }

    fn log_summary(&self, timeline: &Timeline, rhythm: &RhythmStats, brightness: &BrightnessSummary) {
        let stats = &timeline.stats;
        info!("   Beats: {} | Average BPM: {:.1}", stats.total_beats, stats.average_bpm);
        info!("   Tempo changes: {}", stats.tempo_changes);
        if let Some((slowest, fastest)) = bpm_range(timeline) {
            info!("   BPM range: {:.1} - {:.1}", slowest, fastest);
        }
        for change in &timeline.tempo_changes {
            debug!(
                "      {:.2}s: {:.1} BPM ({:+.1}, {:?})",
                change.time, change.bpm, change.delta_bpm, change.kind
            );
        }
        info!(
            "   Rhythm: mean interval {:.3}s, std {:.3}s, consistency {:.2}",
            rhythm.mean_interval, rhythm.std_interval, rhythm.consistency
        );
        info!(
            "   Intervals: {:.3}s - {:.3}s",
            rhythm.interval_min, rhythm.interval_max
        );
        info!(
            "   Energy: {} peaks, range {:.3}-{:.3}",
            stats.energy_peaks, stats.energy_range[0], stats.energy_range[1]
        );
        info!(
            "   Brightness: mean {:.0} Hz ({:.0}-{:.0}), rolloff {:.0} Hz",
            brightness.mean, brightness.min, brightness.max, brightness.mean_rolloff
        );
        info!(
            "   Silent periods: {} (threshold {:.4})",
            stats.silent_periods, stats.silence_threshold
        );
        if let Some(silence) = SilenceTotals::from_intervals(&timeline.silences, stats.duration) {
            info!(
                "   Total silence: {:.2}s ({:.1}% of track)",
                silence.total, silence.percent_of_track
            );
            info!(
                "   Longest silence: {:.2}s | Shortest silence: {:.2}s",
                silence.longest, silence.shortest
            );
        }
        for period in &timeline.silences {
            debug!(
                "      {:.2}s - {:.2}s ({:.2}s)",
                period.start, period.end, period.duration
            );
        }
    }

    // ==========================================
    // PIPELINE STEP 5: EMISSION
    // ==========================================

    async fn emit(&self, timeline: &Timeline, source: &str, audio_reference: &str) -> Result<ArtifactPaths> {
        info!("💾 Step 5: Writing artifacts...");
        let output = &self.config.output;

        let script_path = output.script_path();
        write_atomically(&script_path, &script::render(timeline, source)?).await?;
        info!("   📁 JavaScript code saved to: {}", script_path.display());

        let json_path = output.json_path();
        write_atomically(&json_path, &json::to_json(timeline)?).await?;
        info!("   📁 JSON data saved to: {}", json_path.display());

        let document = if output.patch_document {
            let document_path = output.document_path();
            self.patcher
                .patch_file(&document_path, audio_reference)
                .await?
                .then_some(document_path)
        } else {
            debug!("Document patching disabled");
            None
        };

        Ok(ArtifactPaths {
            script: script_path,
            json: json_path,
            document,
        })
    }
}

/// How the presentation document should refer to the audio file
///
/// A path relative to the document's directory when the audio lives below
/// it, otherwise the path exactly as given on the command line.
fn document_reference(audio_path: &Path, document_path: &Path) -> String {
    let document_dir = document_path.parent().unwrap_or_else(|| Path::new("."));
    let document_dir = if document_dir.as_os_str().is_empty() { Path::new(".") } else { document_dir };

    let relative = std::fs::canonicalize(audio_path)
        .ok()
        .zip(std::fs::canonicalize(document_dir).ok())
        .and_then(|(audio, dir)| audio.strip_prefix(&dir).ok().map(Path::to_path_buf));

    match relative {
        Some(relative) => relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        None => audio_path.display().to_string(),
    }
}

fn bpm_range(timeline: &Timeline) -> Option<(f64, f64)> {
    let mut bpms = timeline.tempo_changes.iter().map(|change| change.bpm);
    let first = bpms.next()?;
    Some(bpms.fold((first, first), |(low, high), bpm| (low.min(bpm), high.max(bpm))))
}

/// Aggregate silence figures for the run summary
#[derive(Debug, Clone, Copy, PartialEq)]
struct SilenceTotals {
    total: f64,
    percent_of_track: f64,
    longest: f64,
    shortest: f64,
}

impl SilenceTotals {
    fn from_intervals(intervals: &[SilenceInterval], duration: f64) -> Option<Self> {
        let first = intervals.first()?.duration;
        let (total, longest, shortest) =
            intervals.iter().fold((0.0, first, first), |(total, longest, shortest), interval| {
                (
                    total + interval.duration,
                    longest.max(interval.duration),
                    shortest.min(interval.duration),
                )
            });
        let percent_of_track = if duration > 0.0 { total / duration * 100.0 } else { 0.0 };

        Some(Self { total, percent_of_track, longest, shortest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::FrameMapping;
    use crate::fusion::{BeatType, TempoChangeEvent, TempoChangeKind};
    use tempfile::{tempdir, TempDir};

    const SAMPLE_RATE: u32 = 22050;

    /// 0.5 s click track with a silent gap between 3 s and 4.5 s
    fn write_click_wav(path: &Path, duration: f64) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();

        let total = (SAMPLE_RATE as f64 * duration) as usize;
        let step = SAMPLE_RATE as usize / 2;
        let click_len = (SAMPLE_RATE as f64 * 0.03) as usize;
        for i in 0..total {
            let t = i as f64 / SAMPLE_RATE as f64;
            let k = i % step;
            let sample = if (3.0..4.5).contains(&t) {
                0.0
            } else if k < click_len {
                let decay = 1.0 - k as f32 / click_len as f32;
                0.8 * decay * (2.0 * std::f32::consts::PI * 1200.0 * k as f32 / SAMPLE_RATE as f32).sin()
            } else {
                0.02 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / SAMPLE_RATE as f32).sin()
            };
            writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn engine_in(dir: &TempDir) -> AnalysisEngine {
        let mut config = Config::default();
        config.output.directory = dir.path().to_path_buf();
        AnalysisEngine::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_full_pipeline_writes_all_artifacts() {
        let dir = tempdir().unwrap();
        let audio_path = dir.path().join("clicks.wav");
        write_click_wav(&audio_path, 8.0);
        std::fs::write(
            dir.path().join("index.html"),
            "<script>const audio = new Audio(\"sound.mp3\");</script>",
        )
        .unwrap();

        let report = engine_in(&dir).run(&audio_path).await.unwrap();
        let timeline = &report.timeline;

        assert_eq!(report.source, "clicks.wav");
        assert!(!timeline.beats.is_empty());
        assert!(timeline.beats.windows(2).all(|w| w[1].time - w[0].time > 0.000999));
        assert!((timeline.stats.duration - 8.0).abs() < 0.01);
        assert_eq!(timeline.stats.total_beats, timeline.beats.len());
        assert!(timeline.silences.iter().any(|s| s.start < 4.0 && s.end > 3.5));

        let script = std::fs::read_to_string(&report.artifacts.script).unwrap();
        assert!(script.contains("const timingMap = ["));
        assert!(script.contains("// AUDIO ANALYSIS RESULTS: clicks.wav"));

        let json = std::fs::read_to_string(&report.artifacts.json).unwrap();
        assert_eq!(&json::from_json(&json).unwrap(), timeline);

        assert_eq!(report.artifacts.document, Some(dir.path().join("index.html")));
        let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(html.contains("new Audio(\"clicks.wav\")"));
    }

    #[tokio::test]
    async fn test_document_references_audio_in_subdirectory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("music")).unwrap();
        let audio_path = dir.path().join("music").join("song.wav");
        write_click_wav(&audio_path, 2.0);
        std::fs::write(dir.path().join("index.html"), "<audio src=\"sound.mp3\"></audio>").unwrap();

        let report = engine_in(&dir).run(&audio_path).await.unwrap();

        assert_eq!(report.source, "song.wav");
        assert_eq!(report.audio_reference, "music/song.wav");
        let html = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert_eq!(html, "<audio src=\"music/song.wav\"></audio>");
        assert!(dir.path().join(&report.audio_reference).is_file());

        let script = std::fs::read_to_string(&report.artifacts.script).unwrap();
        assert!(script.starts_with("// AUDIO ANALYSIS RESULTS: song.wav"));
    }

    #[test]
    fn test_audio_outside_document_dir_keeps_given_path() {
        let site = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        let audio_path = elsewhere.path().join("song.wav");
        std::fs::write(&audio_path, b"").unwrap();

        let reference = document_reference(&audio_path, &site.path().join("index.html"));
        assert_eq!(reference, audio_path.display().to_string());

        let missing = Path::new("not/there.wav");
        assert_eq!(document_reference(missing, &site.path().join("index.html")), "not/there.wav");
    }

    #[test]
    fn test_summary_figures() {
        let silences = vec![
            SilenceInterval { start: 1.0, end: 2.0, duration: 1.0, avg_energy: 0.0 },
            SilenceInterval { start: 5.0, end: 8.0, duration: 3.0, avg_energy: 0.0 },
        ];
        let totals = SilenceTotals::from_intervals(&silences, 10.0).unwrap();
        assert_eq!(totals, SilenceTotals { total: 4.0, percent_of_track: 40.0, longest: 3.0, shortest: 1.0 });
        assert!(SilenceTotals::from_intervals(&[], 10.0).is_none());
        assert_eq!(SilenceTotals::from_intervals(&silences, 0.0).unwrap().percent_of_track, 0.0);

        let mut timeline = Timeline::default();
        assert!(bpm_range(&timeline).is_none());
        timeline.tempo_changes = vec![
            TempoChangeEvent { time: 0.0, bpm: 120.0, delta_bpm: 0.0, kind: TempoChangeKind::Start },
            TempoChangeEvent { time: 4.0, bpm: 140.0, delta_bpm: 20.0, kind: TempoChangeKind::Increase },
            TempoChangeEvent { time: 8.0, bpm: 100.0, delta_bpm: -40.0, kind: TempoChangeKind::Decrease },
        ];
        assert_eq!(bpm_range(&timeline), Some((100.0, 140.0)));
    }

    #[tokio::test]
    async fn test_missing_document_is_not_an_error() {
        let dir = tempdir().unwrap();
        let audio_path = dir.path().join("clicks.wav");
        write_click_wav(&audio_path, 2.0);

        let report = engine_in(&dir).run(&audio_path).await.unwrap();

        assert!(report.artifacts.script.exists());
        assert!(report.artifacts.json.exists());
        assert_eq!(report.artifacts.document, None);
    }

    #[tokio::test]
    async fn test_missing_audio_fails_before_writing() {
        let dir = tempdir().unwrap();
        let engine = engine_in(&dir);

        let err = engine.run(dir.path().join("nope.wav")).await.unwrap_err();

        assert!(err.is_precondition());
        assert!(!engine.config().output.script_path().exists());
        assert!(!engine.config().output.json_path().exists());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.analysis.window_size = 1000;
        assert!(AnalysisEngine::new(config).is_err());
    }

    #[test]
    fn test_analyze_series_of_empty_input() {
        let dir = tempdir().unwrap();
        let series = FeatureSeries::empty(3.0, FrameMapping::new(22050, 512));

        let (timeline, rhythm, _) = engine_in(&dir).analyze_series(&series);

        assert!(timeline.is_empty());
        assert_eq!(timeline.stats.duration, 3.0);
        assert_eq!(timeline.stats.average_bpm, 0.0);
        assert_eq!(rhythm.consistency, 0.0);
        assert!(timeline.state_at(1.0).is_none());
    }

    #[test]
    fn test_analyze_series_classifies_beats() {
        let dir = tempdir().unwrap();
        let frames = FrameMapping::new(22050, 512);
        let mut series = FeatureSeries::empty(2.0, frames);
        series.beat_times = vec![0.0, 0.5, 1.0, 1.5];
        series.onset_envelope = vec![0.0; 100];
        for &t in &series.beat_times {
            series.onset_envelope[frames.time_to_frame(t).unwrap()] = 1.0;
        }
        series.rms = vec![0.1; 100];
        series.times = (0..100).map(|f| frames.frame_to_time(f)).collect();

        let (timeline, rhythm, _) = engine_in(&dir).analyze_series(&series);

        assert_eq!(timeline.beats.len(), 4);
        assert!(timeline.beats.iter().all(|b| b.beat_type == BeatType::Strong));
        assert_eq!(rhythm.mean_interval, 0.5);
        assert_eq!(timeline.stats.rhythm_consistency, 1.0);
        assert!(timeline.silences.is_empty());
    }
}
