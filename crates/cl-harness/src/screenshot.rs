//! Screenshots of a ROM after a fixed number of frames

use std::path::Path;

use cl_core::Config;
use cl_engine::EngineRegistry;
use cl_runner::{Runner, RunnerOptions};
use tracing::info;

use crate::error::Result;
use crate::image::write_frame;

/// Run `frames` frames of the ROM at `path` and save the last one as a PNG
/// at `output`. Engine log output is discarded.
///
/// The runner is returned so callers can keep stepping or inspect it.
pub fn capture(
    path: impl AsRef<Path>,
    registry: &EngineRegistry,
    config: &Config,
    frames: u64,
    output: &Path,
) -> Result<Runner> {
    let options = RunnerOptions::from_config(config).with_sink(|_message: &str| {});
    let mut runner = Runner::new(path, registry, options)?;

    for _ in 0..frames {
        runner.advance_frame();
    }

    write_frame(output, runner.video_buffer())?;
    info!(
        "Wrote frame {} of {} to {}",
        runner.frame_count(),
        runner.filename().display(),
        output.display()
    );
    Ok(runner)
}
