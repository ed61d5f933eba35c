//! Core runtime for the lightbox viewer.
//!
//! A single-threaded cooperative runtime: futures spawned on it are polled
//! by the host's event loop, animations await frames from a [`FrameClock`],
//! and observable [`MutableState`] cells report changes to subscribers.

mod frame_clock;
mod platform;
mod runtime;
mod state;

pub use frame_clock::{FrameCallbackRegistration, FrameClock, NextFrame};
pub use platform::{DefaultScheduler, RuntimeScheduler};
pub use runtime::{FrameCallbackId, Runtime, RuntimeHandle, TaskHandle};
pub use state::{MutableState, State, StateObservers, Subscription};

pub mod prelude {
    pub use crate::frame_clock::FrameClock;
    pub use crate::runtime::{Runtime, RuntimeHandle, TaskHandle};
    pub use crate::state::{MutableState, StateObservers};
}
