//! The runner: one engine, its video buffer and its log sink
//!
//! Ownership is a tree. The runner exclusively owns the engine instance,
//! the buffer the engine renders into and the registered sink. Dropping the
//! runner deinitializes the engine and tears the sink down exactly once.

use std::path::{Path, PathBuf};

use cl_core::{BridgeError, Config, EngineOptions, Result};
use cl_engine::{Engine, EngineHealth, EngineRegistry, LevelMask};
use tracing::{debug, info, warn};

use crate::dispatch::{LogDispatcher, LogStats};
use crate::format::LogFormatter;
use crate::sink::{DefaultStream, LogSink, SinkRegistry};
use crate::video::{VideoBuffer, VideoBufferView};

/// Settings a runner is created with
pub struct RunnerOptions {
    pub filter_mask: LevelMask,
    pub default_stream: DefaultStream,
    pub engine: EngineOptions,
    /// Sink installed before the ROM is loaded, so it sees load-time records
    pub sink: Option<Box<dyn LogSink>>,
}

impl RunnerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            filter_mask: LevelMask::from_bits_retain(config.log.filter_mask),
            default_stream: config.log.default_output.into(),
            engine: config.engine.clone(),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn with_default_stream(mut self, stream: DefaultStream) -> Self {
        self.default_stream = stream;
        self
    }

    pub fn with_filter_mask(mut self, mask: LevelMask) -> Self {
        self.filter_mask = mask;
        self
    }
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Drives one engine instance frame by frame
pub struct Runner {
    engine: Box<dyn Engine>,
    filename: PathBuf,
    video: VideoBuffer,
    log: LogDispatcher,
    frame_count: u64,
}

impl Runner {
    /// Find an engine for `path`, load it and reset it, ready for frames.
    ///
    /// Either a fully wired runner is returned or nothing is: on failure the
    /// engine is deinitialized and the sink from `options` torn down.
    pub fn new(
        path: impl AsRef<Path>,
        registry: &EngineRegistry,
        options: RunnerOptions,
    ) -> Result<Self> {
        let filename = path.as_ref().to_path_buf();
        info!("Creating runner for {}", filename.display());

        let mut engine = registry.find(&filename)?;
        engine
            .init()
            .map_err(|e| BridgeError::EngineInit(e.to_string()))?;

        let (width, height) = engine.desired_dimensions();
        let video = match VideoBuffer::allocate(width, height) {
            Ok(video) => video,
            Err(e) => {
                engine.deinit();
                return Err(e);
            }
        };
        engine.set_video_buffer(video.stride());
        debug!("Allocated {}x{} video buffer", width, height);

        let formatter = LogFormatter::new(engine.categories(), options.filter_mask);
        let mut sinks = SinkRegistry::new(options.default_stream);
        if let Some(sink) = options.sink {
            sinks.register(sink);
        }

        // From here on Drop handles deinit and sink teardown
        let mut runner = Self {
            engine,
            filename,
            video,
            log: LogDispatcher::new(formatter, sinks),
            frame_count: 0,
        };

        runner
            .engine
            .load_file(&runner.filename, &mut runner.log)
            .map_err(|e| BridgeError::RomLoadFailed {
                path: runner.filename.clone(),
                reason: e.to_string(),
            })?;
        runner.engine.apply_config(&options.engine);
        runner.engine.reset(&mut runner.log);

        info!(
            "Runner ready: engine '{}', {}x{}",
            runner.engine.name(),
            width,
            height
        );
        Ok(runner)
    }

    /// Run one display frame, rendering into the owned buffer. Engine
    /// problems surface only through the log and [`Runner::health`].
    pub fn advance_frame(&mut self) {
        self.engine
            .run_frame(self.video.pixels_mut(), &mut self.log);
        self.frame_count += 1;
    }

    /// View of the current frame
    pub fn video_buffer(&self) -> VideoBufferView<'_> {
        self.video.view()
    }

    /// Replace the log sink. The previous sink is torn down now.
    pub fn set_logger(&mut self, sink: impl LogSink + 'static) {
        self.set_boxed_logger(Box::new(sink));
    }

    pub fn set_boxed_logger(&mut self, sink: Box<dyn LogSink>) {
        if self.log.has_sink() {
            debug!("Replacing log sink for {}", self.filename.display());
        }
        self.log.set_sink(sink);
    }

    /// Tear down the sink and go back to the default stream
    pub fn clear_logger(&mut self) {
        self.log.teardown();
    }

    /// Release the engine, the buffer and the sink
    pub fn destroy(self) {
        drop(self);
    }

    pub fn health(&self) -> EngineHealth {
        self.engine.health()
    }

    pub fn log_stats(&self) -> &LogStats {
        self.log.stats()
    }

    pub fn current_cycle(&self) -> u64 {
        self.engine.current_cycle()
    }

    /// Frames advanced since creation
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Width, height and pointer of the buffer, for handing to C callers
    pub fn raw_video_buffer(&mut self) -> (u32, u32, *mut cl_engine::Pixel) {
        (
            self.video.width(),
            self.video.height(),
            self.video.as_mut_ptr(),
        )
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        if let EngineHealth::Faulted(reason) = self.engine.health() {
            warn!(
                "Destroying runner for {} with faulted engine: {}",
                self.filename.display(),
                reason
            );
        }
        self.engine.deinit();
        self.log.teardown();
        info!(
            "Runner for {} destroyed after {} frames",
            self.filename.display(),
            self.frame_count
        );
    }
}
