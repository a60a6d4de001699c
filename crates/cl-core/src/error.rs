//! Error types for the corelink bridge

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for runner creation and configuration
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("No engine recognizes {}", .0.display())]
    EngineNotFound(PathBuf),

    #[error("Failed to allocate a {width}x{height} video buffer")]
    AllocationFailure { width: u32, height: u32 },

    #[error("Engine rejected {}: {reason}", path.display())]
    RomLoadFailed { path: PathBuf, reason: String },

    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Whether this error came from the engine refusing the file or itself,
    /// as opposed to the host environment
    pub fn is_engine_error(&self) -> bool {
        matches!(
            self,
            Self::EngineNotFound(_) | Self::RomLoadFailed { .. } | Self::EngineInit(_)
        )
    }
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BridgeError::EngineNotFound(PathBuf::from("game.bin"));
        assert_eq!(format!("{}", err), "No engine recognizes game.bin");

        let err = BridgeError::AllocationFailure {
            width: 240,
            height: 160,
        };
        assert_eq!(
            format!("{}", err),
            "Failed to allocate a 240x160 video buffer"
        );

        let err = BridgeError::RomLoadFailed {
            path: PathBuf::from("rom.gba"),
            reason: "bad header".to_string(),
        };
        assert_eq!(format!("{}", err), "Engine rejected rom.gba: bad header");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BridgeError = io_err.into();
        assert!(matches!(err, BridgeError::Io(_)));
        assert!(!err.is_engine_error());
        assert!(BridgeError::EngineInit("no bios".into()).is_engine_error());
    }
}
