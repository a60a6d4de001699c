//! Engine discovery

use std::path::Path;

use cl_core::{BridgeError, Result};
use tracing::debug;

use crate::engine::{Engine, EngineFactory};
use crate::null::NullEngineFactory;

/// Ordered list of engine factories; the first one to recognize a file wins
#[derive(Default)]
pub struct EngineRegistry {
    factories: Vec<Box<dyn EngineFactory>>,
}

impl EngineRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the engines that ship with corelink
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(NullEngineFactory));
        registry
    }

    /// Add a factory after the ones already registered
    pub fn register(&mut self, factory: Box<dyn EngineFactory>) {
        debug!("Registered engine factory '{}'", factory.name());
        self.factories.push(factory);
    }

    /// Create an engine for `path`
    pub fn find(&self, path: &Path) -> Result<Box<dyn Engine>> {
        for factory in &self.factories {
            if factory.recognizes(path) {
                debug!("Engine '{}' accepts {}", factory.name(), path.display());
                return Ok(factory.create());
            }
        }

        Err(BridgeError::EngineNotFound(path.to_path_buf()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
