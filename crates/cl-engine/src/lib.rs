//! Execution engine collaborator for corelink
//!
//! The bridge performs no emulation itself. This crate defines what it
//! needs from an engine (the [`Engine`] trait), how engines are discovered
//! for a ROM file ([`EngineRegistry`]), and the log vocabulary engines use
//! to report back ([`LogLevel`], [`LevelMask`], [`CategoryTable`],
//! [`LogHook`]). A test-pattern [`NullEngine`] ships as the only builtin.

pub mod category;
pub mod engine;
pub mod hook;
pub mod level;
pub mod null;
pub mod registry;

pub use category::CategoryTable;
pub use engine::{Engine, EngineError, EngineFactory, EngineHealth, Pixel, BYTES_PER_PIXEL};
pub use hook::LogHook;
pub use level::{LevelMask, LogLevel};
pub use null::{NullEngine, NullEngineFactory};
pub use registry::EngineRegistry;
