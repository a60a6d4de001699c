//! Log sink registration and the default output stream

use std::io::Write;

use cl_core::DefaultOutput;
use cl_engine::LogLevel;
use tracing::{debug, error, info, trace, warn};

/// One delivered record, with its parts and its formatted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub category: &'a str,
    /// Raw level bits as the engine passed them
    pub level: u32,
    pub message: &'a str,
    /// `[<LEVEL>] <category>: <message>`
    pub formatted: &'a str,
}

impl LogRecord<'_> {
    pub fn level(&self) -> LogLevel {
        LogLevel::from_bits(self.level)
    }
}

/// A destination for formatted log records.
///
/// A sink owns whatever resources it needs; dropping it is its teardown.
/// Any `FnMut(&str)` closure is a sink.
pub trait LogSink {
    fn invoke(&mut self, message: &str);

    /// Receive a record with its parts. Sinks that only want the text keep
    /// the default, which passes the formatted string to `invoke`.
    fn record(&mut self, record: &LogRecord<'_>) {
        self.invoke(record.formatted);
    }
}

impl<F: FnMut(&str)> LogSink for F {
    fn invoke(&mut self, message: &str) {
        self(message)
    }
}

/// Where records go when no sink is registered
pub enum DefaultStream {
    Stdout,
    Stderr,
    /// Re-emit records as `tracing` events at the matching level
    Tracing,
    /// Any writer, one record per line
    Writer(Box<dyn Write + Send>),
}

impl DefaultStream {
    pub fn write(&mut self, level: LogLevel, message: &str) {
        match self {
            Self::Stdout => println!("{}", message),
            Self::Stderr => eprintln!("{}", message),
            Self::Tracing => match level {
                LogLevel::Fatal | LogLevel::Error => error!("{}", message),
                LogLevel::Warn | LogLevel::GameError => warn!("{}", message),
                LogLevel::Info => info!("{}", message),
                LogLevel::Debug => debug!("{}", message),
                LogLevel::Stub | LogLevel::Unknown(_) => trace!("{}", message),
            },
            Self::Writer(writer) => {
                if let Err(e) = writeln!(writer, "{}", message) {
                    warn!("Failed to write log record to default stream: {}", e);
                }
            }
        }
    }
}

impl From<DefaultOutput> for DefaultStream {
    fn from(output: DefaultOutput) -> Self {
        match output {
            DefaultOutput::Stdout => Self::Stdout,
            DefaultOutput::Stderr => Self::Stderr,
            DefaultOutput::Tracing => Self::Tracing,
        }
    }
}

impl Default for DefaultStream {
    fn default() -> Self {
        Self::Stdout
    }
}

impl std::fmt::Debug for DefaultStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "Stdout"),
            Self::Stderr => write!(f, "Stderr"),
            Self::Tracing => write!(f, "Tracing"),
            Self::Writer(_) => write!(f, "Writer"),
        }
    }
}

/// Holds at most one sink and falls back to the default stream
#[derive(Default)]
pub struct SinkRegistry {
    sink: Option<Box<dyn LogSink>>,
    default: DefaultStream,
}

impl SinkRegistry {
    pub fn new(default: DefaultStream) -> Self {
        Self { sink: None, default }
    }

    /// Install `sink`, tearing down the one it replaces
    pub fn register(&mut self, sink: Box<dyn LogSink>) {
        if self.sink.replace(sink).is_some() {
            debug!("Replaced log sink, previous sink torn down");
        }
    }

    /// Deliver one record to exactly one destination
    pub fn invoke(&mut self, record: &LogRecord<'_>) {
        match self.sink.as_mut() {
            Some(sink) => sink.record(record),
            None => self.default.write(record.level(), record.formatted),
        }
    }

    /// Tear down the registered sink, if any. Later records use the default
    /// stream.
    pub fn teardown(&mut self) {
        if let Some(sink) = self.sink.take() {
            drop(sink);
            debug!("Log sink torn down");
        }
    }

    pub fn is_registered(&self) -> bool {
        self.sink.is_some()
    }
}
