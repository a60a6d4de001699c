//! Log callbacks supplied by the host
//!
//! A [`Callback`] is an opaque context pointer plus two functions: one that
//! receives each formatted record and one that releases the context. Once
//! handed to `set_logger`, the context belongs to the runner, which calls
//! `destroy` exactly once when the callback is replaced or the runner is
//! freed.

use std::ffi::{c_void, CStr, CString};

use cl_runner::LogSink;
use libc::c_char;

/// Receives one NUL-terminated record, valid only for the duration of the call
pub type CallbackFn = extern "C" fn(data: *mut c_void, message: *const c_char);

/// Releases the callback context
pub type DestroyFn = extern "C" fn(data: *mut c_void);

/// `struct callback` on the C side
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Callback {
    pub data: *mut c_void,
    pub callback: Option<CallbackFn>,
    pub destroy: Option<DestroyFn>,
}

/// Owning wrapper that turns a [`Callback`] into a runner log sink
pub(crate) struct CallbackSink {
    raw: Callback,
}

impl CallbackSink {
    pub(crate) fn new(raw: Callback) -> Self {
        Self { raw }
    }
}

impl LogSink for CallbackSink {
    fn invoke(&mut self, message: &str) {
        if let Some(callback) = self.raw.callback {
            let message = to_c_string(message);
            callback(self.raw.data, message.as_ptr());
        }
    }
}

impl Drop for CallbackSink {
    fn drop(&mut self) {
        if let Some(destroy) = self.raw.destroy {
            destroy(self.raw.data);
        }
    }
}

/// C strings end at the first NUL, so anything after one is dropped
fn to_c_string(message: &str) -> CString {
    let bytes = message.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    CString::new(&bytes[..end]).unwrap_or_default()
}

/// Build a [`Callback`] that forwards records to a Rust closure.
///
/// The closure is boxed into the context pointer and dropped by `destroy`.
/// If the callback is never passed to `set_logger`, call its `destroy` to
/// release the closure.
pub fn closure_callback<F>(f: F) -> Callback
where
    F: FnMut(&str) + 'static,
{
    let data = Box::into_raw(Box::new(f));

    Callback {
        data: data.cast(),
        callback: Some(call_closure::<F>),
        destroy: Some(drop_box::<F>),
    }
}

extern "C" fn call_closure<F>(data: *mut c_void, message: *const c_char)
where
    F: FnMut(&str),
{
    if data.is_null() || message.is_null() {
        return;
    }
    let callback = unsafe { &mut *data.cast::<F>() };
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    callback(&message);
}

extern "C" fn drop_box<T>(data: *mut c_void) {
    if !data.is_null() {
        drop(unsafe { Box::from_raw(data.cast::<T>()) });
    }
}
