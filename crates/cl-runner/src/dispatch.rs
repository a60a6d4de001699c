//! The log hook a runner lends to its engine

use std::fmt;

use cl_engine::{LogHook, LogLevel};

use crate::format::LogFormatter;
use crate::sink::{LogRecord, LogSink, SinkRegistry};

/// Counters over the records an engine has emitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogStats {
    /// Records that passed the filter
    pub delivered: u64,
    /// Records dropped by the filter
    pub suppressed: u64,
    pub fatal: u64,
    pub errors: u64,
    pub warnings: u64,
    /// Formatted text of the most recent FATAL record
    pub last_fatal: Option<String>,
}

/// Filters, formats and delivers engine log records
pub struct LogDispatcher {
    formatter: LogFormatter,
    sinks: SinkRegistry,
    stats: LogStats,
}

impl LogDispatcher {
    pub fn new(formatter: LogFormatter, sinks: SinkRegistry) -> Self {
        Self {
            formatter,
            sinks,
            stats: LogStats::default(),
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn LogSink>) {
        self.sinks.register(sink);
    }

    pub fn teardown(&mut self) {
        self.sinks.teardown();
    }

    pub fn has_sink(&self) -> bool {
        self.sinks.is_registered()
    }

    pub fn stats(&self) -> &LogStats {
        &self.stats
    }
}

impl LogHook for LogDispatcher {
    fn log(&mut self, category: i32, level: u32, args: fmt::Arguments<'_>) {
        if !self.formatter.accepts(level) {
            self.stats.suppressed += 1;
            return;
        }

        let message = args.to_string();
        let formatted = self.formatter.format(category, level, &message);

        self.stats.delivered += 1;
        match LogLevel::from_bits(level) {
            LogLevel::Fatal => {
                self.stats.fatal += 1;
                self.stats.last_fatal = Some(formatted.clone());
            }
            LogLevel::Error | LogLevel::GameError => self.stats.errors += 1,
            LogLevel::Warn => self.stats.warnings += 1,
            _ => {}
        }

        self.sinks.invoke(&LogRecord {
            category: self.formatter.category_name(category),
            level,
            message: &message,
            formatted: &formatted,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::DefaultStream;
    use cl_engine::{CategoryTable, LevelMask};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dispatcher(seen: Rc<RefCell<Vec<String>>>) -> LogDispatcher {
        let mut categories = CategoryTable::new();
        categories.insert(0, "GBA");
        let mut sinks = SinkRegistry::new(DefaultStream::Stderr);
        sinks.register(Box::new(move |m: &str| seen.borrow_mut().push(m.to_string())));
        LogDispatcher::new(LogFormatter::new(categories, LevelMask::DEFAULT), sinks)
    }

    #[test]
    fn test_filtered_records_never_reach_sink() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut log = dispatcher(seen.clone());

        log.emit(0, LogLevel::Stub, format_args!("stubbed"));
        log.emit(0, LogLevel::GameError, format_args!("game"));
        log.log(0, 0x100, format_args!("way out"));
        assert!(seen.borrow().is_empty());
        assert_eq!(log.stats().suppressed, 3);
        assert_eq!(log.stats().delivered, 0);
    }

    #[test]
    fn test_accepted_records_are_formatted_and_counted() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut log = dispatcher(seen.clone());

        log.emit(0, LogLevel::Warn, format_args!("careful"));
        log.emit(0, LogLevel::Fatal, format_args!("boom {}", 7));
        assert_eq!(
            *seen.borrow(),
            vec!["[WARNING] GBA: careful".to_string(), "[FATAL] GBA: boom 7".to_string()]
        );

        let stats = log.stats();
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.warnings, 1);
        assert_eq!(stats.fatal, 1);
        assert_eq!(stats.last_fatal.as_deref(), Some("[FATAL] GBA: boom 7"));
    }
}
