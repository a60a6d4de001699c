//! Log severity levels and the severity filter mask

use bitflags::bitflags;

/// Severity of an engine log record.
///
/// Engines report levels as single-bit integers so that a set of levels can
/// be expressed as a [`LevelMask`]. Values outside the known bits map to
/// [`LogLevel::Unknown`] and keep their raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Stub,
    GameError,
    Unknown(u32),
}

impl LogLevel {
    /// Decode a raw level value
    pub fn from_bits(raw: u32) -> Self {
        match raw {
            0x01 => Self::Fatal,
            0x02 => Self::Error,
            0x04 => Self::Warn,
            0x08 => Self::Info,
            0x10 => Self::Debug,
            0x20 => Self::Stub,
            0x40 => Self::GameError,
            other => Self::Unknown(other),
        }
    }

    /// Raw level value as engines report it
    pub fn bits(self) -> u32 {
        match self {
            Self::Fatal => 0x01,
            Self::Error => 0x02,
            Self::Warn => 0x04,
            Self::Info => 0x08,
            Self::Debug => 0x10,
            Self::Stub => 0x20,
            Self::GameError => 0x40,
            Self::Unknown(raw) => raw,
        }
    }

    /// Display name used in formatted records
    pub fn name(self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARNING",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Stub => "STUB",
            Self::GameError => "GAME ERROR",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Inverse of [`LogLevel::name`]; unrecognized names are `Unknown(0)`
    pub fn from_name(name: &str) -> Self {
        match name {
            "FATAL" => Self::Fatal,
            "ERROR" => Self::Error,
            "WARNING" => Self::Warn,
            "INFO" => Self::Info,
            "DEBUG" => Self::Debug,
            "STUB" => Self::Stub,
            "GAME ERROR" => Self::GameError,
            _ => Self::Unknown(0),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of severity levels that are delivered
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LevelMask: u32 {
        const FATAL      = 0x01;
        const ERROR      = 0x02;
        const WARN       = 0x04;
        const INFO       = 0x08;
        const DEBUG      = 0x10;
        const STUB       = 0x20;
        const GAME_ERROR = 0x40;
    }
}

impl LevelMask {
    /// FATAL through DEBUG; STUB and GAME ERROR are suppressed
    pub const DEFAULT: Self = Self::from_bits_retain(0x1F);

    /// Whether a record at raw level `level` passes the filter
    pub fn allows(self, level: u32) -> bool {
        level & self.bits() != 0
    }
}

impl Default for LevelMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}
