//! Observable state cells.
//!
//! A [`MutableState`] holds a value and notifies a shared
//! [`StateObservers`] registry whenever the value changes. UI layers
//! subscribe to the registry and re-read whatever they render; no
//! particular reactive framework is assumed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type ObserverCallback = Rc<dyn Fn() + 'static>;

#[derive(Default)]
struct ObserversInner {
    callbacks: RefCell<Vec<(u64, ObserverCallback)>>,
    next_id: Cell<u64>,
    batch_depth: Cell<u32>,
    pending: Cell<bool>,
}

/// Registry of change callbacks shared by a group of state cells.
#[derive(Clone, Default)]
pub struct StateObservers {
    inner: Rc<ObserversInner>,
}

impl StateObservers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback`; it stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unregisters the observer"]
    pub fn observe(&self, callback: impl Fn() + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .callbacks
            .borrow_mut()
            .push((id, Rc::new(callback)));
        Subscription {
            observers: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.callbacks.borrow().len()
    }

    /// Invokes every observer, or defers to the end of the outermost
    /// [`batch`](Self::batch).
    pub fn notify(&self) {
        if self.inner.batch_depth.get() > 0 {
            self.inner.pending.set(true);
            return;
        }
        // Observers may subscribe or unsubscribe while being notified.
        let callbacks: Vec<ObserverCallback> = self
            .inner
            .callbacks
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Runs `f`, coalescing every notification it triggers into one.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.inner.batch_depth.set(self.inner.batch_depth.get() + 1);
        let result = f();
        let depth = self.inner.batch_depth.get() - 1;
        self.inner.batch_depth.set(depth);
        if depth == 0 && self.inner.pending.replace(false) {
            self.notify();
        }
        result
    }
}

impl fmt::Debug for StateObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateObservers")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Keeps an observer registered.
pub struct Subscription {
    observers: Weak<ObserversInner>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.observers.upgrade() {
            let mut callbacks = inner.callbacks.borrow_mut();
            if let Some(index) = callbacks.iter().position(|(id, _)| *id == self.id) {
                callbacks.remove(index);
            }
        }
    }
}

/// A value cell that notifies its observers when the value changes.
pub struct MutableState<T> {
    value: Rc<RefCell<T>>,
    observers: StateObservers,
}

impl<T: Clone + PartialEq + 'static> MutableState<T> {
    pub fn new(value: T, observers: StateObservers) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            observers,
        }
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Stores `value`; observers are notified only if it differs.
    pub fn set(&self, value: T) {
        let changed = {
            let mut current = self.value.borrow_mut();
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        };
        if changed {
            self.observers.notify();
        }
    }

    /// Replaces the value and returns the previous one.
    pub fn replace(&self, value: T) -> T {
        let previous = self.get();
        self.set(value);
        previous
    }

    pub fn as_state(&self) -> State<T> {
        State {
            value: Rc::clone(&self.value),
        }
    }
}

impl<T> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            observers: self.observers.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MutableState")
            .field(&*self.value.borrow())
            .finish()
    }
}

/// Read-only view of a [`MutableState`].
pub struct State<T> {
    value: Rc<RefCell<T>>,
}

impl<T: Clone> State<T> {
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_notifies_only_on_change() {
        let observers = StateObservers::new();
        let count = Rc::new(Cell::new(0));
        let _subscription = {
            let count = Rc::clone(&count);
            observers.observe(move || count.set(count.get() + 1))
        };
        let state = MutableState::new(1, observers.clone());

        state.set(1);
        assert_eq!(count.get(), 0);
        state.set(2);
        assert_eq!(count.get(), 1);
        assert_eq!(state.as_state().get(), 2);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let observers = StateObservers::new();
        let count = Rc::new(Cell::new(0));
        let subscription = {
            let count = Rc::clone(&count);
            observers.observe(move || count.set(count.get() + 1))
        };
        drop(subscription);
        assert_eq!(observers.observer_count(), 0);

        MutableState::new(false, observers).set(true);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn batch_coalesces_notifications() {
        let observers = StateObservers::new();
        let count = Rc::new(Cell::new(0));
        let _subscription = {
            let count = Rc::clone(&count);
            observers.observe(move || count.set(count.get() + 1))
        };
        let a = MutableState::new(0, observers.clone());
        let b = MutableState::new(0, observers.clone());

        observers.batch(|| {
            a.set(1);
            b.set(2);
            observers.batch(|| a.set(3));
        });
        assert_eq!(count.get(), 1);
    }
}
