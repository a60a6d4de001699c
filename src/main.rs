//! corelink - run a test ROM through an emulation core
//!
//! Exits successfully only when the ROM reports that all of its tests
//! passed. With `--screenshot`, runs a fixed number of frames and saves the
//! last one as a PNG instead.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use cl_core::{Config, DiagnosticLevel};
use cl_engine::EngineRegistry;
use cl_harness::{Harness, HarnessOutcome};

/// Run a test ROM and report its results
#[derive(Parser, Debug)]
#[command(name = "corelink", version)]
#[command(about = "Run a test ROM through an emulation core", long_about = None)]
struct Args {
    /// ROM to run
    rom: PathBuf,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give up after this many frames
    #[arg(short = 'm', long)]
    max_frames: Option<u64>,

    /// Verbosity of corelink's own diagnostics
    #[arg(short, long)]
    log_level: Option<DiagnosticLevel>,

    /// Save a PNG of the frame reached after `--frames` frames instead of
    /// running the tests
    #[arg(short, long, value_name = "PNG")]
    screenshot: Option<PathBuf>,

    /// Frames to run before taking the screenshot
    #[arg(short, long, default_value = "1")]
    frames: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    if let Some(max_frames) = args.max_frames {
        config.harness.max_frames = Some(max_frames);
    }
    if let Some(level) = args.log_level {
        config.log.level = level;
    }

    cl_core::logging::init(config.log.level);
    tracing::info!("Starting corelink");

    let registry = EngineRegistry::with_builtins();
    let start_failed = || {
        format!(
            "Failed to start {} (available engines: {})",
            args.rom.display(),
            registry.names().join(", ")
        )
    };

    if let Some(output) = &args.screenshot {
        cl_harness::capture(&args.rom, &registry, &config, args.frames, output)
            .with_context(start_failed)?;
        return Ok(());
    }

    let mut harness = Harness::new(&args.rom, &registry, &config).with_context(start_failed)?;

    match harness.run()? {
        HarnessOutcome::Passed => Ok(()),
        outcome => bail!("{}: {}", args.rom.display(), outcome),
    }
}
