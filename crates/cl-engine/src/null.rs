//! Null engine for testing
//!
//! The null engine emulates nothing. It renders a moving test pattern so a
//! host can tell frames are advancing, and replays a text script from the
//! ROM file as log output, one line per frame. This is enough to exercise
//! the driver, the C ABI and the test ROM protocol without a real core.
//!
//! ROM layout: the 8-byte [`NULL_MAGIC`] followed by UTF-8 text. Blank lines
//! are skipped. Two directives are recognized:
//!
//! - `@timer` logs the cycle timer register write on the `GBA I/O` category
//! - `@fatal <message>` logs `<message>` at FATAL and faults the engine
//!
//! Every other line is logged at INFO on the `GBA Debug` category.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use cl_core::EngineOptions;
use tracing::trace;

use crate::category::CategoryTable;
use crate::engine::{Engine, EngineError, EngineFactory, EngineHealth, Pixel};
use crate::hook::LogHook;
use crate::level::LogLevel;

/// Magic header identifying a null engine ROM
pub const NULL_MAGIC: &[u8; 8] = b"CLNULL\0\0";

/// Rendered resolution, matching a GBA screen
pub const NULL_WIDTH: u32 = 240;
pub const NULL_HEIGHT: u32 = 160;

/// Emulated cycles per frame (228 lines of 1232 cycles)
pub const CYCLES_PER_FRAME: u64 = 280_896;

/// Message logged for the `@timer` directive
pub const TIMER_MESSAGE: &str = "Stub I/O register write: FFF800";

const CATEGORY_CORE: i32 = 0;
const CATEGORY_DEBUG: i32 = 1;
const CATEGORY_IO: i32 = 2;

/// One script step
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScriptLine {
    Debug(String),
    Timer,
    Fatal(String),
}

impl ScriptLine {
    fn parse(line: &str) -> Self {
        if line == "@timer" {
            Self::Timer
        } else if let Some(message) = line.strip_prefix("@fatal") {
            Self::Fatal(message.trim().to_string())
        } else {
            Self::Debug(line.to_string())
        }
    }
}

/// Test pattern engine that replays a log script
pub struct NullEngine {
    initialized: bool,
    stride: usize,
    script: Vec<ScriptLine>,
    cursor: usize,
    frame_count: u64,
    cycle: u64,
    health: EngineHealth,
}

impl NullEngine {
    pub fn new() -> Self {
        Self {
            initialized: false,
            stride: NULL_WIDTH as usize,
            script: Vec::new(),
            cursor: 0,
            frame_count: 0,
            cycle: 0,
            health: EngineHealth::Running,
        }
    }

    fn render(&self, pixels: &mut [Pixel]) {
        let shift = self.frame_count as u32;
        for (y, row) in pixels
            .chunks_mut(self.stride)
            .take(NULL_HEIGHT as usize)
            .enumerate()
        {
            for (x, pixel) in row.iter_mut().take(NULL_WIDTH as usize).enumerate() {
                let (x, y) = (x as u32, y as u32);
                let r = (x + shift) & 0xFF;
                let g = (y + shift) & 0xFF;
                let b = (x ^ y) & 0xFF;
                *pixel = r | (g << 8) | (b << 16) | (0xFF << 24);
            }
        }
    }

    fn step_script(&mut self, log: &mut dyn LogHook) {
        let Some(line) = self.script.get(self.cursor).cloned() else {
            if self.health.is_running() {
                self.health = EngineHealth::Halted;
            }
            return;
        };
        self.cursor += 1;

        match line {
            ScriptLine::Debug(message) => {
                log.emit(CATEGORY_DEBUG, LogLevel::Info, format_args!("{}", message));
            }
            ScriptLine::Timer => {
                log.emit(CATEGORY_IO, LogLevel::Stub, format_args!("{}", TIMER_MESSAGE));
            }
            ScriptLine::Fatal(message) => {
                log.emit(CATEGORY_CORE, LogLevel::Fatal, format_args!("{}", message));
                self.health = EngineHealth::Faulted(message);
            }
        }
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    fn init(&mut self) -> Result<(), EngineError> {
        self.initialized = true;
        Ok(())
    }

    fn desired_dimensions(&self) -> (u32, u32) {
        (NULL_WIDTH, NULL_HEIGHT)
    }

    fn set_video_buffer(&mut self, stride: usize) {
        self.stride = stride.max(1);
    }

    fn load_file(&mut self, path: &Path, log: &mut dyn LogHook) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }

        let data = std::fs::read(path)?;
        let body = data
            .strip_prefix(NULL_MAGIC.as_slice())
            .ok_or_else(|| EngineError::InvalidRom("missing null engine header".to_string()))?;
        let text = std::str::from_utf8(body)
            .map_err(|e| EngineError::InvalidRom(format!("script is not UTF-8: {}", e)))?;

        self.script = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(ScriptLine::parse)
            .collect();

        log.emit(
            CATEGORY_CORE,
            LogLevel::Debug,
            format_args!("Loaded {} script lines from {}", self.script.len(), path.display()),
        );
        Ok(())
    }

    fn apply_config(&mut self, options: &EngineOptions) {
        // Nothing to emulate, so nothing to configure
        trace!("Null engine ignoring options {:?}", options);
    }

    fn reset(&mut self, log: &mut dyn LogHook) {
        self.cursor = 0;
        self.frame_count = 0;
        self.cycle = 0;
        self.health = EngineHealth::Running;
        log.emit(CATEGORY_CORE, LogLevel::Debug, format_args!("Reset"));
    }

    fn run_frame(&mut self, pixels: &mut [Pixel], log: &mut dyn LogHook) {
        if !self.initialized {
            return;
        }

        self.render(pixels);
        self.step_script(log);
        self.frame_count += 1;
        self.cycle += CYCLES_PER_FRAME;
        trace!("Null engine frame {}", self.frame_count);
    }

    fn deinit(&mut self) {
        self.initialized = false;
        self.script.clear();
    }

    fn categories(&self) -> CategoryTable {
        let mut table = CategoryTable::new();
        table.insert(CATEGORY_CORE, "Null Core");
        table.insert(CATEGORY_DEBUG, "GBA Debug");
        table.insert(CATEGORY_IO, "GBA I/O");
        table
    }

    fn health(&self) -> EngineHealth {
        self.health.clone()
    }

    fn current_cycle(&self) -> u64 {
        self.cycle
    }
}

/// Factory recognizing null engine ROMs by their header
pub struct NullEngineFactory;

impl EngineFactory for NullEngineFactory {
    fn name(&self) -> &str {
        "null"
    }

    fn recognizes(&self, path: &Path) -> bool {
        let mut header = [0u8; 8];
        File::open(path)
            .and_then(|mut file| file.read_exact(&mut header))
            .map(|_| &header == NULL_MAGIC)
            .unwrap_or(false)
    }

    fn create(&self) -> Box<dyn Engine> {
        Box::new(NullEngine::new())
    }
}
