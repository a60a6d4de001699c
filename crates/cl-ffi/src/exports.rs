//! Exported C entry points
//!
//! Handles are boxed [`Runner`]s. NULL handles are ignored; any other
//! invalid or already freed handle is undefined behavior, as in C.
//! Panics inside an engine stop at the boundary and are logged.

use std::any::Any;
use std::ffi::CStr;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use cl_engine::{EngineHealth, Pixel};
use cl_runner::Runner;
use libc::c_char;
use tracing::{error, warn};

use crate::callback::{Callback, CallbackSink};
use crate::registry::create_runner;

/// `struct video_buffer` on the C side
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawVideoBuffer {
    pub width: u32,
    pub height: u32,
    pub buffer: *mut Pixel,
}

pub const HEALTH_INVALID: i32 = -1;
pub const HEALTH_RUNNING: i32 = 0;
pub const HEALTH_HALTED: i32 = 1;
pub const HEALTH_FAULTED: i32 = 2;

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

/// Run `f`, returning `fallback` instead of unwinding into the host
fn guarded<T>(entry: &str, fallback: T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            error!("{} panicked: {}", entry, panic_reason(payload.as_ref()));
            fallback
        }
    }
}

#[cfg(unix)]
fn path_from_c(filename: &CStr) -> Option<PathBuf> {
    use std::os::unix::ffi::OsStrExt;
    Some(PathBuf::from(std::ffi::OsStr::from_bytes(filename.to_bytes())))
}

#[cfg(not(unix))]
fn path_from_c(filename: &CStr) -> Option<PathBuf> {
    filename.to_str().ok().map(PathBuf::from)
}

/// Create a runner for the ROM at `filename`.
///
/// Returns NULL if `filename` is NULL, no engine recognizes the file, or
/// the engine fails (or panics) while initializing or loading it.
///
/// # Safety
/// `filename` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn new_runner(filename: *const c_char) -> *mut Runner {
    if filename.is_null() {
        warn!("new_runner called with a NULL filename");
        return std::ptr::null_mut();
    }

    let filename = unsafe { CStr::from_ptr(filename) };
    let Some(path) = path_from_c(filename) else {
        error!("new_runner: filename {:?} is not a valid path", filename);
        return std::ptr::null_mut();
    };

    guarded("new_runner", std::ptr::null_mut(), || match create_runner(&path) {
        Ok(runner) => Box::into_raw(Box::new(runner)),
        Err(e) => {
            error!("Failed to create runner for {}: {}", path.display(), e);
            std::ptr::null_mut()
        }
    })
}

/// Register `callback` as the runner's log destination.
///
/// Ownership of `callback.data` passes to the runner. The previously
/// registered callback is destroyed. A NULL `callback.callback` returns the
/// runner to its default stream and destroys `callback.data` right away, as
/// does a NULL `runner`.
///
/// # Safety
/// `runner` must be NULL or a live handle from [`new_runner`]. The callback
/// functions must be safe to call with `callback.data`.
#[no_mangle]
pub unsafe extern "C" fn set_logger(runner: *mut Runner, callback: Callback) {
    let sink = CallbackSink::new(callback);

    let Some(runner) = (unsafe { runner.as_mut() }) else {
        warn!("set_logger called with a NULL runner");
        return;
    };

    guarded("set_logger", (), || {
        if callback.callback.is_none() {
            runner.clear_logger();
            drop(sink);
        } else {
            runner.set_logger(sink);
        }
    })
}

/// Run one frame. Blocks until the engine has produced it. If the engine
/// panics, the frame is abandoned and the buffer keeps whatever it had
/// drawn so far.
///
/// # Safety
/// `runner` must be NULL or a live handle from [`new_runner`].
#[no_mangle]
pub unsafe extern "C" fn advance_frame(runner: *mut Runner) {
    match unsafe { runner.as_mut() } {
        Some(runner) => guarded("advance_frame", (), || runner.advance_frame()),
        None => warn!("advance_frame called with a NULL runner"),
    }
}

/// Describe the runner's video buffer. The memory stays owned by the runner
/// and is overwritten by the next [`advance_frame`]; never free it.
///
/// # Safety
/// `runner` must be NULL or a live handle from [`new_runner`].
#[no_mangle]
pub unsafe extern "C" fn get_video_buffer(runner: *mut Runner) -> RawVideoBuffer {
    match unsafe { runner.as_mut() } {
        Some(runner) => {
            let (width, height, buffer) = runner.raw_video_buffer();
            RawVideoBuffer {
                width,
                height,
                buffer,
            }
        }
        None => {
            warn!("get_video_buffer called with a NULL runner");
            RawVideoBuffer {
                width: 0,
                height: 0,
                buffer: std::ptr::null_mut(),
            }
        }
    }
}

/// Engine state after the last frame, one of the `HEALTH_*` codes
///
/// # Safety
/// `runner` must be NULL or a live handle from [`new_runner`].
#[no_mangle]
pub unsafe extern "C" fn get_engine_health(runner: *const Runner) -> i32 {
    match unsafe { runner.as_ref() }.map(Runner::health) {
        Some(EngineHealth::Running) => HEALTH_RUNNING,
        Some(EngineHealth::Halted) => HEALTH_HALTED,
        Some(EngineHealth::Faulted(_)) => HEALTH_FAULTED,
        None => HEALTH_INVALID,
    }
}

/// Deinitialize the engine, destroy the callback and free the runner.
///
/// # Safety
/// `runner` must be NULL or a live handle from [`new_runner`], and must not
/// be used again afterwards.
#[no_mangle]
pub unsafe extern "C" fn free_runner(runner: *mut Runner) {
    if runner.is_null() {
        return;
    }
    let runner = unsafe { Box::from_raw(runner) };
    guarded("free_runner", (), move || drop(runner));
}
