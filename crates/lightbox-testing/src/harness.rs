//! Deterministic frame driver.

use std::cell::Cell;
use std::future::Future;
use std::sync::Arc;

use lightbox_core::{DefaultScheduler, FrameClock, Runtime, RuntimeHandle, TaskHandle};

/// One frame at 60 Hz.
pub const FRAME_NANOS: u64 = 16_666_667;

/// Frames [`FrameHarness::run_until_idle`] runs before giving up.
const MAX_IDLE_FRAMES: usize = 10_000;

/// Owns a [`Runtime`] and a fake clock.
///
/// Time only moves when a frame is advanced, so every animation step is
/// reproducible.
pub struct FrameHarness {
    runtime: Runtime,
    now_nanos: Cell<u64>,
}

impl Default for FrameHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHarness {
    pub fn new() -> Self {
        Self {
            runtime: Runtime::new(Arc::new(DefaultScheduler)),
            now_nanos: Cell::new(0),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn clock(&self) -> FrameClock {
        self.runtime.frame_clock()
    }

    pub fn now_nanos(&self) -> u64 {
        self.now_nanos.get()
    }

    pub fn now_millis(&self) -> u64 {
        self.now_nanos.get() / 1_000_000
    }

    /// Spawns `future` and polls it once so it can register for a frame.
    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) -> TaskHandle {
        let task = self
            .handle()
            .spawn_ui(future)
            .expect("harness runtime is alive");
        self.pump();
        task
    }

    /// Runs queued UI work and ready futures without advancing time.
    pub fn pump(&self) {
        self.handle().drain_ui();
    }

    /// Advances the clock by one frame and runs it.
    pub fn advance_frame(&self) {
        let now = self.now_nanos.get() + FRAME_NANOS;
        self.now_nanos.set(now);
        self.handle().run_frame(now);
    }

    /// Runs frames until at least `millis` have elapsed.
    pub fn advance_by_millis(&self, millis: u64) {
        let until = self.now_nanos.get() + millis * 1_000_000;
        while self.now_nanos.get() < until {
            self.advance_frame();
        }
    }

    pub fn is_idle(&self) -> bool {
        let handle = self.handle();
        !handle.has_tasks() && !handle.has_frame_callbacks() && !handle.has_pending_ui()
    }

    /// Runs frames until nothing is left to do and returns how many ran.
    ///
    /// Panics if the runtime is still busy after a generous number of frames.
    pub fn run_until_idle(&self) -> usize {
        self.pump();
        let mut frames = 0;
        while !self.is_idle() {
            assert!(
                frames < MAX_IDLE_FRAMES,
                "runtime still busy after {MAX_IDLE_FRAMES} frames"
            );
            self.advance_frame();
            frames += 1;
        }
        frames
    }
}
