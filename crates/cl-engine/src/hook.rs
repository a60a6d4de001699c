//! The hook engines call back into for every log record they emit

use std::fmt;

use crate::level::LogLevel;

/// Receiver for engine log records.
///
/// The driver lends an implementation to every engine call that may log.
/// Records are delivered synchronously on the calling thread, so an
/// implementation must not try to drive the engine again from `log`.
pub trait LogHook {
    /// Deliver one record. `level` is the raw level value, which may lie
    /// outside the known [`LogLevel`] bits.
    fn log(&mut self, category: i32, level: u32, args: fmt::Arguments<'_>);

    /// Convenience wrapper for engines that log with a known level
    fn emit(&mut self, category: i32, level: LogLevel, args: fmt::Arguments<'_>) {
        self.log(category, level.bits(), args);
    }
}

impl<H: LogHook + ?Sized> LogHook for &mut H {
    fn log(&mut self, category: i32, level: u32, args: fmt::Arguments<'_>) {
        (**self).log(category, level, args);
    }
}
