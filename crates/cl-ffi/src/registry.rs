//! Process-wide state behind the C entry points
//!
//! C hosts only pass a filename to `new_runner`, so the engines it can pick
//! from and the options runners are created with live here. Rust hosts can
//! add engines and swap the options before creating runners.

use std::path::Path;

use cl_core::{Config, Result};
use cl_engine::{EngineFactory, EngineRegistry};
use cl_runner::{Runner, RunnerOptions};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::info;

/// Engines available to `new_runner`
static ENGINES: Lazy<RwLock<EngineRegistry>> =
    Lazy::new(|| RwLock::new(EngineRegistry::with_builtins()));

/// Options for runners created through the C ABI
static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Make an engine available to runners created after this call
pub fn register_engine(factory: Box<dyn EngineFactory>) {
    info!("Registering engine '{}' for C ABI runners", factory.name());
    ENGINES.write().register(factory);
}

/// Replace the options used by runners created after this call
pub fn set_config(config: Config) {
    *CONFIG.write() = config;
}

pub(crate) fn create_runner(path: &Path) -> Result<Runner> {
    let options = RunnerOptions::from_config(&CONFIG.read());
    let engines = ENGINES.read();
    Runner::new(path, &engines, options)
}
