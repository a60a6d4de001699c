//! Runner lifecycle for corelink
//!
//! A [`Runner`] wires one engine instance to a video buffer it owns and to a
//! log sink, then steps the engine one frame at a time:
//! - [`format`]: renders and filters engine log records
//! - [`sink`]: the single registered log destination and the default stream
//! - [`dispatch`]: the log hook handed to the engine
//! - [`video`]: the pixel buffer the engine renders into
//! - [`runner`]: creation, frame stepping and teardown

pub mod dispatch;
pub mod format;
pub mod runner;
pub mod sink;
pub mod video;

pub use dispatch::{LogDispatcher, LogStats};
pub use format::{format_record, LogFormatter};
pub use runner::{Runner, RunnerOptions};
pub use sink::{DefaultStream, LogRecord, LogSink, SinkRegistry};
pub use video::{VideoBuffer, VideoBufferView};
