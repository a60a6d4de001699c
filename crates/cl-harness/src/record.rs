//! Engine log records as the harness queues them

use cl_engine::LogLevel;
use cl_runner::LogRecord;

/// One record, owned so it can wait until the frame has finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: LogLevel,
    pub category: String,
    pub message: String,
}

impl Record {
    pub fn is_fatal(&self) -> bool {
        self.level == LogLevel::Fatal
    }
}

impl From<&LogRecord<'_>> for Record {
    fn from(record: &LogRecord<'_>) -> Self {
        Self {
            level: record.level(),
            category: record.category.to_string(),
            message: record.message.to_string(),
        }
    }
}
