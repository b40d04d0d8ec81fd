//! hookdetect - Find hook segments in a song
//!
//! Usage: hookdetect <input> [--clips-dir <dir>]

use anyhow::{Context, Result};
use clap::Parser;
use hookline_cli::output::{print_json_report, HookEntry, HookReport};
use hookline_core::{detect_hooks, HookConfig};
use hookline_media::{
    decode_to_mono, write_segment, DemucsCommand, MediaFetcher, NoSeparation, VocalSeparator,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "hookdetect")]
#[command(about = "Detect hook segments in a song file or URL", long_about = None)]
struct Args {
    /// Audio file path, or a URL to download with yt-dlp
    input: String,

    /// TOML configuration file (defaults apply otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of hooks to report
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Run demucs vocal separation before analysis
    #[arg(long)]
    separate: bool,

    /// Write each detected hook as a WAV clip into this directory
    #[arg(long)]
    clips_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Default: no logs (clean JSON output for parsing)
    // Verbose: show Info level logs for debugging
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    run_detect(&args)
}

fn run_detect(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => HookConfig::from_toml_file(path)?,
        None => HookConfig::default(),
    };
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    config.validate()?;

    // Keep the scratch dir alive until decoding is done.
    let fetch_dir = tempfile::tempdir().context("cannot create download directory")?;
    let input_path = resolve_input(&args.input, fetch_dir.path())?;

    let start = std::time::Instant::now();
    let audio = decode_to_mono(&input_path, config.sample_rate)?;
    log::info!(
        "decoded audio: {:.1}s duration, {} samples @ {}Hz",
        audio.duration_secs(),
        audio.samples.len(),
        audio.sample_rate
    );

    let separator: Box<dyn VocalSeparator> = if args.separate {
        Box::new(DemucsCommand::default())
    } else {
        Box::new(NoSeparation)
    };
    log::info!("separation: {}", separator.name());
    let analysis = separator.separate(&audio.samples, audio.sample_rate)?;

    let hooks = detect_hooks(&analysis, audio.sample_rate, &config)?;
    let elapsed = start.elapsed();
    log::info!(
        "found {} hooks in {:.2}s",
        hooks.len(),
        elapsed.as_secs_f64()
    );

    let mut entries = Vec::with_capacity(hooks.len());
    for (i, hook) in hooks.iter().enumerate() {
        let clip_path = match &args.clips_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
                let path = dir.join(format!("hook_{}.wav", i + 1));
                // Clips come from the original mix, not the separated stem.
                write_segment(&audio, hook.start_time, hook.duration, &path)?;
                Some(path.display().to_string())
            }
            None => None,
        };
        entries.push(HookEntry::new(hook, clip_path));
    }

    let report = HookReport::new(args.input.clone(), entries, elapsed.as_secs_f64());
    print_json_report(&report);

    Ok(())
}

/// Treat http(s) inputs as remote media, everything else as a local path
fn resolve_input(input: &str, fetch_dir: &Path) -> Result<PathBuf> {
    if input.starts_with("http://") || input.starts_with("https://") {
        let fetcher = MediaFetcher::new();
        return fetcher.fetch(input, fetch_dir);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("input file not found: {}", path.display());
    }
    Ok(path)
}
