//! The execution engine interface
//!
//! An engine is the emulation core proper: it interprets the loaded program
//! and renders frames. The driver only sequences calls into it, in this order:
//!
//! 1. [`Engine::init`]
//! 2. [`Engine::desired_dimensions`], then the driver allocates the buffer
//! 3. [`Engine::set_video_buffer`]
//! 4. [`Engine::load_file`]
//! 5. [`Engine::apply_config`]
//! 6. [`Engine::reset`]
//! 7. any number of [`Engine::run_frame`]
//! 8. [`Engine::deinit`], exactly once
//!
//! [`Engine::deinit`] is also called if any step after `init` fails.

use std::path::Path;

use cl_core::EngineOptions;
use thiserror::Error;

use crate::category::CategoryTable;
use crate::hook::LogHook;

/// One pixel of the video buffer, 4 bytes in R, G, B, A memory order
pub type Pixel = u32;

/// Size of a [`Pixel`] in bytes; the buffer layout depends on it
pub const BYTES_PER_PIXEL: usize = 4;

const _: () = assert!(std::mem::size_of::<Pixel>() == BYTES_PER_PIXEL);

/// Errors an engine reports from fallible calls
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid ROM: {0}")]
    InvalidRom(String),

    #[error("Engine not initialized")]
    NotInitialized,

    #[error("Initialization failed: {0}")]
    Init(String),
}

/// Coarse engine state, queried after frames since `run_frame` itself has
/// no error channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineHealth {
    /// Executing normally
    Running,
    /// The program stopped on its own (halt loop, end of script)
    Halted,
    /// The engine hit a condition it cannot continue from
    Faulted(String),
}

impl EngineHealth {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl std::fmt::Display for EngineHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Halted => write!(f, "halted"),
            Self::Faulted(reason) => write!(f, "faulted: {}", reason),
        }
    }
}

/// An emulation core driven by a runner
pub trait Engine {
    /// Short name for diagnostics
    fn name(&self) -> &str;

    fn init(&mut self) -> Result<(), EngineError>;

    /// Width and height the engine wants to render at. Queried once; the
    /// buffer keeps these dimensions for the runner's lifetime.
    fn desired_dimensions(&self) -> (u32, u32);

    /// Tell the engine the row stride, in pixels, of the buffer it will be
    /// handed in [`Engine::run_frame`]
    fn set_video_buffer(&mut self, stride: usize);

    fn load_file(&mut self, path: &Path, log: &mut dyn LogHook) -> Result<(), EngineError>;

    fn apply_config(&mut self, options: &EngineOptions);

    /// Return to the initial architectural state
    fn reset(&mut self, log: &mut dyn LogHook);

    /// Run exactly one display frame of emulated time, rendering into `pixels`
    fn run_frame(&mut self, pixels: &mut [Pixel], log: &mut dyn LogHook);

    fn deinit(&mut self);

    /// Names for the category ids this engine logs with
    fn categories(&self) -> CategoryTable;

    fn health(&self) -> EngineHealth {
        EngineHealth::Running
    }

    /// Emulated cycles since the last reset
    fn current_cycle(&self) -> u64 {
        0
    }
}

/// Recognizes files an engine can run and creates engine instances
pub trait EngineFactory: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this engine can handle the file at `path`
    fn recognizes(&self, path: &Path) -> bool;

    fn create(&self) -> Box<dyn Engine>;
}
