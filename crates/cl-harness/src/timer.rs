//! Cycle timer toggled by a register write from the test ROM

/// Each toggle alternates between starting a measurement and finishing it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleTimer {
    /// No measurement has been made yet
    #[default]
    Idle,
    /// Started at this cycle
    Started(u64),
    /// Last completed measurement, in cycles
    Measured(u64),
}

impl CycleTimer {
    pub fn toggle(&mut self, now: u64) {
        *self = match *self {
            Self::Started(start) => Self::Measured(now.saturating_sub(start)),
            Self::Idle | Self::Measured(_) => Self::Started(now),
        };
    }

    /// Cycles of the last completed measurement
    pub fn measured(&self) -> Option<u64> {
        match *self {
            Self::Measured(cycles) => Some(cycles),
            _ => None,
        }
    }
}

/// Convert a cycle count to seconds, rounded to two decimals
pub fn cycles_to_seconds(cycles: u64, clock_hz: f64) -> f64 {
    ((cycles as f64 / clock_hz) * 100.0).round() / 100.0
}
