//! The test ROM protocol
//!
//! Records are queued by the runner's sink while a frame runs and handled
//! once it returns, so image checks can read the finished frame.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cl_core::{Config, HarnessConfig};
use cl_engine::{EngineHealth, EngineRegistry, LevelMask, LogLevel};
use cl_runner::{LogRecord, LogSink, Runner, RunnerOptions};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{HarnessError, Result};
use crate::image::{compare_frame, write_frame, ImageMatch};
use crate::record::Record;
use crate::timer::{cycles_to_seconds, CycleTimer};

/// Message a test ROM logs once every test has run
pub const FINISHED_MESSAGE: &str = "Tests finished successfully";

/// How a harness run ended
#[derive(Debug, Clone, PartialEq)]
pub enum HarnessOutcome {
    Passed,
    Failed(String),
    /// Frame limit reached before the ROM finished
    TimedOut(u64),
    /// The engine stopped before the ROM finished
    EngineStopped(EngineHealth),
}

impl HarnessOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for HarnessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
            Self::TimedOut(frames) => write!(f, "timed out after {} frames", frames),
            Self::EngineStopped(health) => write!(f, "engine stopped ({})", health),
        }
    }
}

/// Sink keeping records for handling once the frame returns
#[derive(Clone, Default)]
struct RecordQueue(Arc<Mutex<VecDeque<Record>>>);

impl LogSink for RecordQueue {
    fn invoke(&mut self, message: &str) {
        // Bare text has no category, so only the completion message applies
        self.0.lock().push_back(Record {
            level: LogLevel::Unknown(0),
            category: String::new(),
            message: message.to_string(),
        });
    }

    fn record(&mut self, record: &LogRecord<'_>) {
        self.0.lock().push_back(record.into());
    }
}

/// Runs one test ROM to completion
pub struct Harness<W: Write = io::Stdout> {
    runner: Runner,
    records: RecordQueue,
    config: HarnessConfig,
    timer: CycleTimer,
    /// Some test soft-failed
    failed: bool,
    /// The test in progress soft-failed
    test_failed: bool,
    out: W,
}

impl Harness<io::Stdout> {
    /// Create a harness reporting progress on stdout
    pub fn new(path: impl AsRef<Path>, registry: &EngineRegistry, config: &Config) -> Result<Self> {
        Self::with_output(path, registry, config, io::stdout())
    }
}

impl<W: Write> Harness<W> {
    /// Create a harness reporting progress to `out`
    pub fn with_output(
        path: impl AsRef<Path>,
        registry: &EngineRegistry,
        config: &Config,
        out: W,
    ) -> Result<Self> {
        let records = RecordQueue::default();
        let queue = records.clone();

        // The timer toggle is a STUB record, which the default mask drops
        let mask = LevelMask::from_bits_retain(config.log.filter_mask) | LevelMask::STUB;
        let options = RunnerOptions::from_config(config)
            .with_filter_mask(mask)
            .with_sink(queue);

        let runner = Runner::new(path, registry, options)?;

        Ok(Self {
            runner,
            records,
            config: config.harness.clone(),
            timer: CycleTimer::default(),
            failed: false,
            test_failed: false,
            out,
        })
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Progress report written so far
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Step frames until the ROM finishes, fails or stops
    pub fn run(&mut self) -> Result<HarnessOutcome> {
        info!("Running {}", self.runner.filename().display());
        loop {
            if let Some(outcome) = self.step()? {
                let stats = self.runner.log_stats();
                info!(
                    "{} {} after {} frames ({} records, {} filtered, {} warnings, {} errors, {} fatal)",
                    self.runner.filename().display(),
                    outcome,
                    self.runner.frame_count(),
                    stats.delivered,
                    stats.suppressed,
                    stats.warnings,
                    stats.errors,
                    stats.fatal
                );
                if let Some(fatal) = &stats.last_fatal {
                    debug!("Last fatal record: {}", fatal);
                }
                return Ok(outcome);
            }
        }
    }

    /// Run one frame and handle what it logged
    pub fn step(&mut self) -> Result<Option<HarnessOutcome>> {
        self.runner.advance_frame();

        loop {
            // Released before handling
            let Some(record) = self.records.0.lock().pop_front() else {
                break;
            };
            if let Some(outcome) = self.handle(record)? {
                return Ok(Some(outcome));
            }
        }

        let frames = self.runner.frame_count();
        if self.config.max_frames.is_some_and(|max| frames >= max) {
            return Ok(Some(HarnessOutcome::TimedOut(frames)));
        }

        let health = self.runner.health();
        if !health.is_running() {
            return Ok(Some(HarnessOutcome::EngineStopped(health)));
        }

        Ok(None)
    }

    fn handle(&mut self, record: Record) -> Result<Option<HarnessOutcome>> {
        if record.is_fatal() {
            writeln!(self.out)?;
            return Ok(Some(HarnessOutcome::Failed(format!(
                "fatal message: {}",
                record.message
            ))));
        }

        if record.category == self.config.timer_category
            && record.message == self.config.timer_message
        {
            self.timer.toggle(self.runner.current_cycle());
        } else if record.category == self.config.debug_category {
            self.handle_debug(&record.message)?;
        }

        if record.message == FINISHED_MESSAGE {
            return Ok(Some(if self.failed {
                writeln!(self.out, "Tests failed")?;
                HarnessOutcome::Failed("one or more tests failed".to_string())
            } else {
                writeln!(self.out, "{}", record.message)?;
                HarnessOutcome::Passed
            }));
        }

        Ok(None)
    }

    fn handle_debug(&mut self, message: &str) -> Result<()> {
        if let Some(image) = message.strip_prefix("image:") {
            self.check_image(Path::new(image))?;
        } else if message.ends_with("...") {
            write!(self.out, "{}", message)?;
            self.out.flush()?;
        } else if message == "[ok]" {
            let status = if std::mem::take(&mut self.test_failed) {
                "fail"
            } else {
                "ok"
            };
            match self.timer.measured() {
                Some(cycles) => writeln!(
                    self.out,
                    "[{}: {} c ≈ {} s]",
                    status,
                    cycles,
                    cycles_to_seconds(cycles, self.config.clock_hz)
                )?,
                None => writeln!(self.out, "[{}]", status)?,
            }
        } else if message != FINISHED_MESSAGE {
            writeln!(self.out, "{}", message)?;
        }
        Ok(())
    }

    fn check_image(&mut self, path: &Path) -> Result<()> {
        let frame = self.runner.video_buffer();

        let failure = match compare_frame(path, frame) {
            Ok(ImageMatch::Match) => return Ok(()),
            Ok(ImageMatch::SizeMismatch { expected, actual }) => format!(
                "image is {}x{} but the frame is {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Ok(ImageMatch::PixelMismatch { x, y }) => {
                let mut failure = format!("images differ at ({}, {})", x, y);
                if self.config.write_mismatch_images {
                    let actual = mismatch_path(path);
                    match write_frame(&actual, frame) {
                        Ok(()) => failure.push_str(&format!(
                            ", actual output written to {}",
                            actual.display()
                        )),
                        Err(e) => failure.push_str(&format!(
                            ", and writing the actual output failed: {}",
                            e
                        )),
                    }
                }
                failure
            }
            Err(HarnessError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                let mut failure = format!("{} does not exist", path.display());
                if self.config.write_mismatch_images {
                    match write_frame(path, frame) {
                        Ok(()) => failure.push_str(", writing the current frame in its place"),
                        Err(e) => failure.push_str(&format!(
                            ", and writing the current frame failed: {}",
                            e
                        )),
                    }
                }
                failure
            }
            Err(e) => format!("could not compare against {}: {}", path.display(), e),
        };

        warn!("Image check failed: {}", failure);
        writeln!(self.out)?;
        writeln!(self.out, "{}", failure)?;
        self.failed = true;
        self.test_failed = true;
        Ok(())
    }
}

/// Where to put the actual frame when it differs from `expected`
fn mismatch_path(expected: &Path) -> PathBuf {
    let stem = expected
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    std::env::temp_dir().join(format!("corelink-{}-actual.png", stem))
}
