use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rhythm_timeline::{config::Config, AnalysisEngine, TimelineError};

#[derive(Parser)]
#[command(
    name = "rhythm-timeline",
    version,
    about = "Analyze a music track into a per-beat timeline for audio-reactive visuals",
    long_about = "rhythm-timeline detects beats, tempo changes, energy peaks and silent periods in an audio file, writes them as a JavaScript module and as JSON, and points the presentation document at the analyzed track."
)]
struct Cli {
    /// Audio file path (WAV, MP3, FLAC, OGG, M4A)
    audio: PathBuf,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the generated artifacts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Leave the presentation document untouched
    #[arg(long)]
    no_patch: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    if !cli.audio.exists() {
        eprintln!("Error: Audio file not found at '{}'", cli.audio.display());
        eprintln!("Make sure the file path is correct and the file exists.\n");
        eprintln!("{}", Cli::command().render_usage());
        return Ok(ExitCode::FAILURE);
    }

    info!("Starting rhythm-timeline v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            match Config::from_file(config_path) {
                Ok(config) => config,
                Err(e) => return Ok(report_failure(&e)),
            }
        }
        None => Config::default(),
    };
    if let Some(dir) = cli.output_dir {
        config.output.directory = dir;
    }
    if cli.no_patch {
        config.output.patch_document = false;
    }

    let engine = match AnalysisEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => return Ok(report_failure(&e)),
    };

    let report = match engine.run(&cli.audio).await {
        Ok(report) => report,
        Err(e) => return Ok(report_failure(&e)),
    };

    let stats = &report.timeline.stats;
    println!("🎵 Audio file analyzed: {}", report.source);
    println!(
        "⏱️  Duration: {:.2}s | Beats: {} | BPM: {:.1}",
        stats.duration, stats.total_beats, stats.average_bpm
    );
    println!(
        "🔇 Silent periods: {} | Threshold: {:.4}",
        stats.silent_periods, stats.silence_threshold
    );

    Ok(ExitCode::SUCCESS)
}

fn report_failure(error: &TimelineError) -> ExitCode {
    eprintln!("❌ Error: {}", error.user_message());
    for hint in error.hints() {
        eprintln!("   {}", hint);
    }
    ExitCode::FAILURE
}
