//! Test ROM harness for corelink
//!
//! Test ROMs report their progress through debug log output. The harness
//! steps a [`cl_runner::Runner`] frame by frame, reads those records back
//! and turns them into a [`HarnessOutcome`]. [`capture`] saves a frame
//! after a fixed number of frames instead.

pub mod error;
pub mod harness;
pub mod image;
pub mod record;
pub mod screenshot;
pub mod timer;

pub use error::{HarnessError, Result};
pub use harness::{Harness, HarnessOutcome};
pub use image::{compare_frame, write_frame, ImageMatch};
pub use record::Record;
pub use screenshot::capture;
pub use timer::CycleTimer;
