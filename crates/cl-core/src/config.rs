//! Configuration system for corelink

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub log: LogConfig,
    pub engine: EngineOptions,
    pub harness: HarnessConfig,
}

/// Engine log delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Records whose level shares no bit with this mask are dropped
    pub filter_mask: u32,
    /// Where records go when no sink is registered
    pub default_output: DefaultOutput,
    /// Verbosity of the bridge's own diagnostics
    pub level: DiagnosticLevel,
}

/// Default destination for engine log records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DefaultOutput {
    #[default]
    Stdout,
    Stderr,
    /// Re-emit records as `tracing` events
    Tracing,
}

/// Logging level for bridge diagnostics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl DiagnosticLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl std::str::FromStr for DiagnosticLevel {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(BridgeError::Config(format!("unknown log level '{}'", other))),
        }
    }
}

/// Options applied to the engine right after the ROM is loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineOptions {
    /// Master volume, 0x100 is unity gain
    pub volume: u32,
    pub use_bios: bool,
    pub skip_bios: bool,
    pub frameskip: u32,
    /// Audio buffer size in samples
    pub audio_buffer_size: u32,
}

/// Test ROM harness settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Give up after this many frames
    pub max_frames: Option<u64>,
    /// Emulated clock rate used to turn cycle counts into seconds
    pub clock_hz: f64,
    /// Category carrying the test protocol messages
    pub debug_category: String,
    /// Category and message of the register write that toggles the cycle timer
    pub timer_category: String,
    pub timer_message: String,
    /// Write the actual frame next to a missing or mismatching expected image
    pub write_mismatch_images: bool,
}

// Default implementations

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter_mask: 0x1F,
            default_output: DefaultOutput::default(),
            level: DiagnosticLevel::default(),
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            volume: 0x100,
            use_bios: true,
            skip_bios: false,
            frameskip: 0,
            audio_buffer_size: 0x4000,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_frames: None,
            clock_hz: 16_777_216.0,
            debug_category: "GBA Debug".to_string(),
            timer_category: "GBA I/O".to_string(),
            timer_message: "Stub I/O register write: FFF800".to_string(),
            write_mismatch_images: true,
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| BridgeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("corelink")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log.filter_mask, 0x1F);
        assert_eq!(config.log.default_output, DefaultOutput::Stdout);
        assert_eq!(config.engine.volume, 0x100);
        assert!(config.engine.use_bios);
        assert_eq!(config.harness.max_frames, None);
        assert_eq!(config.harness.debug_category, "GBA Debug");
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.log.default_output = DefaultOutput::Tracing;
        config.harness.max_frames = Some(600);

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.log.default_output, DefaultOutput::Tracing);
        assert_eq!(parsed.harness.max_frames, Some(600));
        assert_eq!(parsed.engine, config.engine);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[log]\nfilter_mask = 127\n").unwrap();
        assert_eq!(parsed.log.filter_mask, 0x7F);
        assert_eq!(parsed.log.level, DiagnosticLevel::Info);
        assert_eq!(parsed.engine.audio_buffer_size, 0x4000);
    }

    #[test]
    fn test_save_and_load_roundtrip_on_disk() {
        let path = std::env::temp_dir()
            .join(format!("corelink-config-{}", std::process::id()))
            .join("config.toml");
        let mut config = Config::default();
        config.engine.skip_bios = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.engine.skip_bios);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("WARNING".parse::<DiagnosticLevel>().unwrap(), DiagnosticLevel::Warn);
        assert_eq!("trace".parse::<DiagnosticLevel>().unwrap(), DiagnosticLevel::Trace);
        assert!("loud".parse::<DiagnosticLevel>().is_err());
    }
}
