//! Log record formatting and severity filtering

use std::fmt::Display;

use cl_engine::{CategoryTable, LevelMask, LogLevel};

/// Render a record as `[<LEVEL>] <category>: <message>`
pub fn format_record(category: &str, level: LogLevel, message: impl Display) -> String {
    format!("[{}] {}: {}", level.name(), category, message)
}

/// Formats records for one engine and decides which ones are delivered
#[derive(Debug, Clone)]
pub struct LogFormatter {
    categories: CategoryTable,
    mask: LevelMask,
}

impl LogFormatter {
    pub fn new(categories: CategoryTable, mask: LevelMask) -> Self {
        Self { categories, mask }
    }

    /// Whether a record at raw level `level` is delivered at all
    pub fn accepts(&self, level: u32) -> bool {
        self.mask.allows(level)
    }

    pub fn format(&self, category: i32, level: u32, message: impl Display) -> String {
        format_record(
            self.category_name(category),
            LogLevel::from_bits(level),
            message,
        )
    }

    pub fn category_name(&self, category: i32) -> &str {
        self.categories.name(category)
    }
}
