//! Lifecycle tests for the runner against a scripted mock engine

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cl_core::{BridgeError, EngineOptions};
use cl_engine::{
    CategoryTable, Engine, EngineError, EngineFactory, EngineHealth, EngineRegistry, LevelMask,
    LogHook, LogLevel, Pixel,
};
use cl_runner::{DefaultStream, LogSink, Runner, RunnerOptions};
use parking_lot::Mutex;

/// Calls observed by the mock, shared with the test
#[derive(Debug, Default)]
struct Calls {
    init: usize,
    deinit: usize,
    load: usize,
    reset: usize,
    frames: usize,
    stride: Option<usize>,
    volume: Option<u32>,
}

#[derive(Clone)]
struct MockSpec {
    extension: &'static str,
    dimensions: (u32, u32),
    fail_init: bool,
    fail_load: bool,
    /// Raw level of the record emitted each frame
    frame_level: u32,
}

impl Default for MockSpec {
    fn default() -> Self {
        Self {
            extension: "mock",
            dimensions: (160, 144),
            fail_init: false,
            fail_load: false,
            frame_level: LogLevel::Info.bits(),
        }
    }
}

struct MockEngine {
    spec: MockSpec,
    calls: Arc<Mutex<Calls>>,
    frame: u32,
}

impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn init(&mut self) -> Result<(), EngineError> {
        self.calls.lock().init += 1;
        if self.spec.fail_init {
            return Err(EngineError::Init("no bios".to_string()));
        }
        Ok(())
    }

    fn desired_dimensions(&self) -> (u32, u32) {
        self.spec.dimensions
    }

    fn set_video_buffer(&mut self, stride: usize) {
        self.calls.lock().stride = Some(stride);
    }

    fn load_file(&mut self, _path: &Path, log: &mut dyn LogHook) -> Result<(), EngineError> {
        self.calls.lock().load += 1;
        log.emit(0, LogLevel::Info, format_args!("loading"));
        if self.spec.fail_load {
            return Err(EngineError::InvalidRom("bad checksum".to_string()));
        }
        Ok(())
    }

    fn apply_config(&mut self, options: &EngineOptions) {
        self.calls.lock().volume = Some(options.volume);
    }

    fn reset(&mut self, _log: &mut dyn LogHook) {
        self.calls.lock().reset += 1;
        self.frame = 0;
    }

    fn run_frame(&mut self, pixels: &mut [Pixel], log: &mut dyn LogHook) {
        self.frame += 1;
        pixels.fill(self.frame);
        self.calls.lock().frames += 1;
        log.log(1, self.spec.frame_level, format_args!("frame {}", self.frame));
    }

    fn deinit(&mut self) {
        self.calls.lock().deinit += 1;
    }

    fn categories(&self) -> CategoryTable {
        let mut table = CategoryTable::new();
        table.insert(0, "Mock");
        table.insert(1, "Mock Video");
        table
    }

    fn health(&self) -> EngineHealth {
        if self.frame >= 3 {
            EngineHealth::Halted
        } else {
            EngineHealth::Running
        }
    }

    fn current_cycle(&self) -> u64 {
        self.frame as u64 * 70224
    }
}

struct MockFactory {
    spec: MockSpec,
    calls: Arc<Mutex<Calls>>,
}

impl EngineFactory for MockFactory {
    fn name(&self) -> &str {
        "mock"
    }

    fn recognizes(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == self.spec.extension)
    }

    fn create(&self) -> Box<dyn Engine> {
        Box::new(MockEngine {
            spec: self.spec.clone(),
            calls: self.calls.clone(),
            frame: 0,
        })
    }
}

fn registry(spec: MockSpec) -> (EngineRegistry, Arc<Mutex<Calls>>) {
    let calls = Arc::new(Mutex::new(Calls::default()));
    let mut registry = EngineRegistry::new();
    registry.register(Box::new(MockFactory {
        spec,
        calls: calls.clone(),
    }));
    (registry, calls)
}

/// Sink recording messages and counting its own teardown
struct TrackedSink {
    messages: Rc<RefCell<Vec<String>>>,
    teardowns: Arc<AtomicUsize>,
}

impl TrackedSink {
    fn new() -> (Self, Rc<RefCell<Vec<String>>>, Arc<AtomicUsize>) {
        let messages = Rc::new(RefCell::new(Vec::new()));
        let teardowns = Arc::new(AtomicUsize::new(0));
        (
            Self {
                messages: messages.clone(),
                teardowns: teardowns.clone(),
            },
            messages,
            teardowns,
        )
    }
}

impl LogSink for TrackedSink {
    fn invoke(&mut self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

impl Drop for TrackedSink {
    fn drop(&mut self) {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
struct SharedOut(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedOut {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedOut {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn quiet_options() -> RunnerOptions {
    RunnerOptions::default().with_default_stream(DefaultStream::Writer(Box::new(std::io::sink())))
}

fn rom() -> PathBuf {
    PathBuf::from("game.mock")
}

#[test]
fn test_create_wires_buffer_to_engine_dimensions() {
    let (registry, calls) = registry(MockSpec::default());
    let runner = Runner::new(rom(), &registry, quiet_options()).unwrap();

    let view = runner.video_buffer();
    assert_eq!(view.size(), (160, 144));
    assert_eq!(view.as_bytes().len(), 160 * 144 * 4);
    assert_eq!(runner.engine_name(), "mock");
    assert_eq!(runner.filename(), Path::new("game.mock"));

    let calls = calls.lock();
    assert_eq!(calls.init, 1);
    assert_eq!(calls.load, 1);
    assert_eq!(calls.reset, 1);
    assert_eq!(calls.stride, Some(160));
    assert_eq!(calls.volume, Some(0x100));
    assert_eq!(calls.deinit, 0);
}

#[test]
fn test_unsupported_file_is_engine_not_found() {
    let (registry, calls) = registry(MockSpec::default());
    let err = Runner::new("game.nes", &registry, quiet_options()).err().unwrap();
    assert!(matches!(err, BridgeError::EngineNotFound(p) if p == Path::new("game.nes")));
    assert_eq!(calls.lock().init, 0);
}

#[test]
fn test_init_failure_aborts_creation() {
    let (registry, calls) = registry(MockSpec {
        fail_init: true,
        ..MockSpec::default()
    });
    let err = Runner::new(rom(), &registry, quiet_options()).err().unwrap();
    assert!(matches!(err, BridgeError::EngineInit(_)));
    assert_eq!(calls.lock().load, 0);
}

#[test]
fn test_zero_sized_engine_is_allocation_failure() {
    let (registry, calls) = registry(MockSpec {
        dimensions: (0, 0),
        ..MockSpec::default()
    });
    let err = Runner::new(rom(), &registry, quiet_options()).err().unwrap();
    assert!(matches!(err, BridgeError::AllocationFailure { .. }));
    assert_eq!(calls.lock().deinit, 1);
}

#[test]
fn test_load_failure_releases_everything() {
    let (registry, calls) = registry(MockSpec {
        fail_load: true,
        ..MockSpec::default()
    });
    let (sink, messages, teardowns) = TrackedSink::new();
    let options = quiet_options().with_sink(sink);

    let err = Runner::new(rom(), &registry, options).err().unwrap();
    match err {
        BridgeError::RomLoadFailed { path, reason } => {
            assert_eq!(path, rom());
            assert!(reason.contains("bad checksum"));
        }
        other => panic!("unexpected error: {}", other),
    }

    let calls = calls.lock();
    assert_eq!(calls.deinit, 1);
    assert_eq!(calls.reset, 0);
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    assert_eq!(*messages.borrow(), vec!["[INFO] Mock: loading".to_string()]);
}

#[test]
fn test_advance_frame_updates_buffer_in_place() {
    let (registry, calls) = registry(MockSpec::default());
    let mut runner = Runner::new(rom(), &registry, quiet_options()).unwrap();

    for n in 1..=5u32 {
        runner.advance_frame();
        let view = runner.video_buffer();
        assert_eq!(view.size(), (160, 144));
        assert!(view.pixels().iter().all(|&p| p == n));
    }

    assert_eq!(runner.frame_count(), 5);
    assert_eq!(calls.lock().frames, 5);
    assert_eq!(runner.current_cycle(), 5 * 70224);
}

#[test]
fn test_health_reflects_engine() {
    let (registry, _calls) = registry(MockSpec::default());
    let mut runner = Runner::new(rom(), &registry, quiet_options()).unwrap();

    assert_eq!(runner.health(), EngineHealth::Running);
    for _ in 0..3 {
        runner.advance_frame();
    }
    assert_eq!(runner.health(), EngineHealth::Halted);
}

#[test]
fn test_records_go_to_default_stream_without_sink() {
    let (registry, _calls) = registry(MockSpec::default());
    let out = SharedOut::default();
    let options =
        RunnerOptions::default().with_default_stream(DefaultStream::Writer(Box::new(out.clone())));
    let mut runner = Runner::new(rom(), &registry, options).unwrap();

    runner.advance_frame();
    assert_eq!(
        out.lines(),
        vec![
            "[INFO] Mock: loading".to_string(),
            "[INFO] Mock Video: frame 1".to_string()
        ]
    );
}

#[test]
fn test_records_go_only_to_sink_when_registered() {
    let (registry, _calls) = registry(MockSpec::default());
    let out = SharedOut::default();
    let options =
        RunnerOptions::default().with_default_stream(DefaultStream::Writer(Box::new(out.clone())));
    let mut runner = Runner::new(rom(), &registry, options).unwrap();
    let before = out.lines().len();

    let (sink, messages, _teardowns) = TrackedSink::new();
    runner.set_logger(sink);
    runner.advance_frame();

    assert_eq!(*messages.borrow(), vec!["[INFO] Mock Video: frame 1".to_string()]);
    assert_eq!(out.lines().len(), before);
}

#[test]
fn test_levels_outside_mask_are_never_delivered() {
    for level in [LogLevel::Stub.bits(), LogLevel::GameError.bits(), 0x80, 0] {
        let (registry, _calls) = registry(MockSpec {
            frame_level: level,
            ..MockSpec::default()
        });
        let out = SharedOut::default();
        let options = RunnerOptions::default()
            .with_default_stream(DefaultStream::Writer(Box::new(out.clone())));
        let mut runner = Runner::new(rom(), &registry, options).unwrap();
        let (sink, messages, _teardowns) = TrackedSink::new();
        runner.set_logger(sink);

        runner.advance_frame();
        assert!(messages.borrow().is_empty(), "level {:#x} leaked to sink", level);
        assert_eq!(out.lines().len(), 1, "only the load record reaches the stream");
        assert_eq!(runner.log_stats().suppressed, 1);
    }
}

#[test]
fn test_mask_can_be_widened() {
    let (registry, _calls) = registry(MockSpec {
        frame_level: LogLevel::Stub.bits(),
        ..MockSpec::default()
    });
    let (sink, messages, _teardowns) = TrackedSink::new();
    let options = quiet_options()
        .with_filter_mask(LevelMask::DEFAULT | LevelMask::STUB)
        .with_sink(sink);
    let mut runner = Runner::new(rom(), &registry, options).unwrap();

    runner.advance_frame();
    assert_eq!(
        messages.borrow().last().map(String::as_str),
        Some("[STUB] Mock Video: frame 1")
    );
}

#[test]
fn test_destroy_without_sink_is_clean() {
    let (registry, calls) = registry(MockSpec::default());
    let runner = Runner::new(rom(), &registry, quiet_options()).unwrap();
    runner.destroy();
    assert_eq!(calls.lock().deinit, 1);
}

#[test]
fn test_destroy_tears_down_sink_once() {
    let (registry, calls) = registry(MockSpec::default());
    let mut runner = Runner::new(rom(), &registry, quiet_options()).unwrap();
    let (sink, _messages, teardowns) = TrackedSink::new();
    runner.set_logger(sink);
    runner.advance_frame();
    assert_eq!(teardowns.load(Ordering::SeqCst), 0);

    runner.destroy();
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    assert_eq!(calls.lock().deinit, 1);
}

#[test]
fn test_replacing_sink_releases_previous_one() {
    let (registry, _calls) = registry(MockSpec::default());
    let mut runner = Runner::new(rom(), &registry, quiet_options()).unwrap();

    let (first, first_messages, first_teardowns) = TrackedSink::new();
    let (second, second_messages, second_teardowns) = TrackedSink::new();

    runner.set_logger(first);
    runner.advance_frame();
    runner.set_logger(second);
    assert_eq!(first_teardowns.load(Ordering::SeqCst), 1);
    runner.advance_frame();

    drop(runner);
    assert_eq!(first_teardowns.load(Ordering::SeqCst), 1);
    assert_eq!(second_teardowns.load(Ordering::SeqCst), 1);
    assert_eq!(first_messages.borrow().len(), 1);
    assert_eq!(*second_messages.borrow(), vec!["[INFO] Mock Video: frame 2".to_string()]);
}

#[test]
fn test_clear_logger_falls_back_to_default_stream() {
    let (registry, _calls) = registry(MockSpec::default());
    let out = SharedOut::default();
    let options =
        RunnerOptions::default().with_default_stream(DefaultStream::Writer(Box::new(out.clone())));
    let mut runner = Runner::new(rom(), &registry, options).unwrap();

    let (sink, _messages, teardowns) = TrackedSink::new();
    runner.set_logger(sink);
    runner.clear_logger();
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);

    runner.advance_frame();
    assert_eq!(out.lines().last().map(String::as_str), Some("[INFO] Mock Video: frame 1"));
}
