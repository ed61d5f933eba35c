use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use crate::frame_clock::FrameClock;
use crate::platform::RuntimeScheduler;

pub type FrameCallbackId = u64;

type FrameCallback = Box<dyn FnOnce(u64) + 'static>;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
    next_frame_callback_id: Cell<u64>,
    tasks: RefCell<Vec<TaskEntry>>,
    next_task_id: Cell<u64>,
    task_waker: RefCell<Option<Waker>>,
    /// Set by wakers and by `spawn_ui`; cleared when the task list is polled.
    poll_requested: Arc<AtomicBool>,
}

struct TaskEntry {
    id: u64,
    active: Rc<Cell<bool>>,
    future: Pin<Box<dyn Future<Output = ()> + 'static>>,
}

struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: Option<FrameCallback>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            frame_callbacks: RefCell::new(VecDeque::new()),
            next_frame_callback_id: Cell::new(1),
            tasks: RefCell::new(Vec::new()),
            next_task_id: Cell::new(1),
            task_waker: RefCell::new(None),
            poll_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    fn init_task_waker(this: &Rc<Self>) {
        let waker = RuntimeTaskWaker {
            scheduler: this.scheduler.clone(),
            poll_requested: Arc::clone(&this.poll_requested),
        }
        .into_waker();
        *this.task_waker.borrow_mut() = Some(waker);
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn spawn_ui_task(&self, future: Pin<Box<dyn Future<Output = ()> + 'static>>) -> TaskEntryHandle {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        let active = Rc::new(Cell::new(true));
        self.tasks.borrow_mut().push(TaskEntry {
            id,
            active: Rc::clone(&active),
            future,
        });
        self.poll_requested.store(true, Ordering::SeqCst);
        self.schedule();
        TaskEntryHandle { id, active }
    }

    fn cancel_task(&self, id: u64) {
        // The future is dropped after the borrow is released: its destructors
        // may cancel frame callbacks or touch other runtime queues.
        let removed = {
            let mut tasks = self.tasks.borrow_mut();
            tasks
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| tasks.remove(index))
        };
        if let Some(entry) = removed {
            entry.active.set(false);
            drop(entry);
        }
    }

    fn cancel_all_tasks(&self) {
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        for entry in &tasks {
            entry.active.set(false);
        }
        drop(tasks);
    }

    fn poll_async_tasks(&self) {
        let waker = match self.task_waker.borrow().as_ref() {
            Some(waker) => waker.clone(),
            None => return,
        };
        self.poll_requested.store(false, Ordering::SeqCst);
        let mut cx = Context::from_waker(&waker);
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        let mut pending = Vec::with_capacity(tasks.len());
        for mut entry in tasks {
            if !entry.active.get() {
                continue;
            }
            match entry.future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => entry.active.set(false),
                Poll::Pending => {
                    // A task may cancel itself (or a sibling) while polled.
                    if entry.active.get() {
                        pending.push(entry);
                    }
                }
            }
        }
        if !pending.is_empty() {
            self.tasks.borrow_mut().extend(pending);
        }
    }

    fn drain_ui(&self) {
        // Polling may wake or spawn further tasks; keep going until none is.
        while self.poll_requested.load(Ordering::SeqCst) && self.task_waker.borrow().is_some() {
            self.poll_async_tasks();
        }
        self.update_needs_frame();
    }

    fn has_pending_ui(&self) -> bool {
        self.poll_requested.load(Ordering::SeqCst)
    }

    fn has_tasks(&self) -> bool {
        self.tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true)
    }

    fn register_frame_callback(&self, callback: FrameCallback) -> FrameCallbackId {
        let id = self.next_frame_callback_id.get();
        self.next_frame_callback_id.set(id + 1);
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry {
                id,
                callback: Some(callback),
            });
        self.schedule();
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        let Ok(mut callbacks) = self.frame_callbacks.try_borrow_mut() else {
            // Callbacks are being drained right now; the entry was already
            // taken out of the queue.
            return;
        };
        if let Some(index) = callbacks.iter().position(|entry| entry.id == id) {
            callbacks.remove(index);
        }
        drop(callbacks);
        self.update_needs_frame();
    }

    fn has_frame_callbacks(&self) -> bool {
        self.frame_callbacks
            .try_borrow()
            .map(|callbacks| !callbacks.is_empty())
            .unwrap_or(true)
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        let pending: Vec<FrameCallback> = {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            callbacks
                .drain(..)
                .filter_map(|mut entry| entry.callback.take())
                .collect()
        };
        for callback in pending {
            callback(frame_time_nanos);
        }
        self.update_needs_frame();
    }

    fn update_needs_frame(&self) {
        if !self.has_frame_callbacks() && !self.has_pending_ui() {
            self.needs_frame.set(false);
        }
    }
}

/// Owner of a single-threaded cooperative runtime.
///
/// The runtime polls spawned futures when the host calls
/// [`RuntimeHandle::drain_ui`], and fires frame callbacks from
/// [`RuntimeHandle::drain_frame_callbacks`]. Dropping the runtime drops every
/// pending future, which cancels it.
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let inner = Rc::new(RuntimeInner::new(scheduler));
        RuntimeInner::init_task_waker(&inner);
        Self { inner }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.inner.cancel_all_tasks();
        self.inner.frame_callbacks.borrow_mut().clear();
    }
}

/// Weak, cloneable handle to a [`Runtime`].
///
/// Every operation becomes a no-op once the runtime has been dropped.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

struct TaskEntryHandle {
    id: u64,
    active: Rc<Cell<bool>>,
}

/// Handle to a spawned future. Dropping the handle does not cancel the task.
pub struct TaskHandle {
    id: u64,
    active: Rc<Cell<bool>>,
    runtime: RuntimeHandle,
}

impl RuntimeHandle {
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn schedule(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.schedule();
        }
    }

    /// Spawns a future on the runtime. Returns `None` when the runtime is gone.
    pub fn spawn_ui<F>(&self, fut: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let entry = inner.spawn_ui_task(Box::pin(fut));
            TaskHandle {
                id: entry.id,
                active: entry.active,
                runtime: self.clone(),
            }
        })
    }

    pub fn cancel_task(&self, id: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_task(id);
        }
    }

    pub fn drain_ui(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_ui();
        }
    }

    pub fn has_pending_ui(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_pending_ui())
            .unwrap_or(false)
    }

    /// True while any spawned future has not completed.
    pub fn has_tasks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_tasks())
            .unwrap_or(false)
    }

    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        }
    }

    pub fn has_frame_callbacks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.has_frame_callbacks())
            .unwrap_or(false)
    }

    /// Fires the frame callbacks for `frame_time_nanos`, then runs every task
    /// that became ready as a result.
    pub fn run_frame(&self, frame_time_nanos: u64) {
        self.drain_frame_callbacks(frame_time_nanos);
        self.drain_ui();
    }

    pub fn needs_frame(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.needs_frame.get())
            .unwrap_or(false)
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// False once the future completed or was canceled.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn cancel(self) {
        if self.active.replace(false) {
            self.runtime.cancel_task(self.id);
        }
    }
}

struct RuntimeTaskWaker {
    scheduler: Arc<dyn RuntimeScheduler>,
    poll_requested: Arc<AtomicBool>,
}

impl RuntimeTaskWaker {
    fn into_waker(self) -> Waker {
        futures_task::waker(Arc::new(self))
    }
}

impl futures_task::ArcWake for RuntimeTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.poll_requested.store(true, Ordering::SeqCst);
        arc_self.scheduler.schedule_frame();
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
