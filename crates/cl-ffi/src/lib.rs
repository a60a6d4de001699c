//! C ABI bridge for corelink
//!
//! Exposes runner creation, frame stepping, video buffer access and log
//! callbacks to a host process. The matching declarations live in
//! `include/corelink.h`.

pub mod callback;
pub mod exports;
pub mod registry;

pub use callback::{closure_callback, Callback, CallbackFn, DestroyFn};
pub use exports::{
    advance_frame, free_runner, get_engine_health, get_video_buffer, new_runner, set_logger,
    RawVideoBuffer, HEALTH_FAULTED, HEALTH_HALTED, HEALTH_INVALID, HEALTH_RUNNING,
};
pub use registry::{register_engine, set_config};
