//! Testing utilities for the lightbox crates
//!
//! [`FrameHarness`] owns a runtime and a fake clock so tests can step
//! animations frame by frame; [`PointerRobot`] scripts pointer events with
//! consistent previous/current state and timestamps.

pub mod harness;
pub mod robot;

pub use harness::{FrameHarness, FRAME_NANOS};
pub use robot::PointerRobot;

pub mod prelude {
    pub use crate::harness::{FrameHarness, FRAME_NANOS};
    pub use crate::robot::PointerRobot;
}
