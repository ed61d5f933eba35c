use crate::runtime::{FrameCallbackId, RuntimeHandle};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Source of frame times for animations.
///
/// Animations await [`FrameClock::next_frame`] once per step; the host
/// advances time by calling `drain_frame_callbacks` on the runtime.
#[derive(Clone)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// Runs `callback` with the time of the next frame. Dropping the
    /// registration before then unregisters it.
    pub fn with_frame_nanos(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        match self.runtime.register_frame_callback(callback) {
            Some(id) => FrameCallbackRegistration::new(self.runtime.clone(), id),
            None => FrameCallbackRegistration::inactive(self.runtime.clone()),
        }
    }

    /// Resolves with the time of the next frame, in nanoseconds.
    ///
    /// Never resolves once the runtime is gone; the owning task is dropped
    /// together with the runtime in that case.
    pub fn next_frame(&self) -> NextFrame {
        NextFrame {
            clock: self.clone(),
            state: Rc::new(RefCell::new(NextFrameState::default())),
        }
    }
}

/// Keeps a frame callback registered. Dropping it unregisters the callback.
pub struct FrameCallbackRegistration {
    runtime: RuntimeHandle,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    fn new(runtime: RuntimeHandle, id: FrameCallbackId) -> Self {
        Self {
            runtime,
            id: Some(id),
        }
    }

    fn inactive(runtime: RuntimeHandle) -> Self {
        Self { runtime, id: None }
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

#[derive(Default)]
struct NextFrameState {
    registration: Option<FrameCallbackRegistration>,
    time: Option<u64>,
    waker: Option<Waker>,
}

pub struct NextFrame {
    clock: FrameClock,
    state: Rc<RefCell<NextFrameState>>,
}

impl Future for NextFrame {
    type Output = u64;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let needs_registration = {
            let mut state = self.state.borrow_mut();
            if let Some(time) = state.time {
                return Poll::Ready(time);
            }
            state.waker = Some(cx.waker().clone());
            state.registration.is_none()
        };

        if needs_registration {
            let weak = Rc::downgrade(&self.state);
            let registration = self.clock.with_frame_nanos(move |time| {
                if let Some(state) = weak.upgrade() {
                    let waker = {
                        let mut state = state.borrow_mut();
                        state.time = Some(time);
                        // Already fired; nothing left to unregister.
                        if let Some(mut registration) = state.registration.take() {
                            registration.id = None;
                        }
                        state.waker.take()
                    };
                    if let Some(waker) = waker {
                        waker.wake();
                    }
                }
            });
            self.state.borrow_mut().registration = Some(registration);
        }

        Poll::Pending
    }
}
