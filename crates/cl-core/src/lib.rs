//! Core types for corelink
//!
//! This crate provides the error taxonomy, configuration and logging
//! infrastructure shared by the engine driver, the C ABI bridge and the
//! test harness.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, DefaultOutput, DiagnosticLevel, EngineOptions, HarnessConfig, LogConfig};
pub use error::{BridgeError, Result};
