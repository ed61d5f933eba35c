//! Platform abstraction for the lightbox runtime.
//!
//! The runtime never blocks or spins on its own. Hosts implement
//! [`RuntimeScheduler`] to learn when there is work to do and then call
//! back into the runtime from their event loop.

/// Schedules work for the lightbox runtime.
///
/// Implementations are responsible for triggering frame processing on
/// behalf of the runtime. Wakers may call this from any thread, so
/// implementations must be thread-safe.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}

/// Scheduler for hosts that drive frames unconditionally.
#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}
