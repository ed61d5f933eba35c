//! Frame-driven animated values.
//!
//! An [`Animatable`] owns a value and its velocity. Animations are plain
//! futures that advance the value once per frame of a [`FrameClock`];
//! starting a new animation or snapping supersedes whatever
//! animation was running, and the superseded future resolves on its next
//! frame with [`AnimationEndReason::Superseded`].

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use lightbox_core::{FrameClock, StateObservers};

use crate::animation::{AnimationType, AnimationVector};
use crate::decay_spec::{calculate_target_value, FloatDecayAnimationSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEndReason {
    /// Reached its target, or a decay came to rest.
    Finished,
    /// Stopped by a bound; the reported velocity is the one at impact.
    BoundReached,
    /// Another animation or a snap took over.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState<T> {
    pub value: T,
    pub velocity: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationResult<T> {
    pub end_reason: AnimationEndReason,
    pub end_state: AnimationState<T>,
}

impl<T> AnimationResult<T> {
    pub fn is_finished(&self) -> bool {
        self.end_reason == AnimationEndReason::Finished
    }

    pub fn is_superseded(&self) -> bool {
        self.end_reason == AnimationEndReason::Superseded
    }
}

struct AnimatableInner<T> {
    label: &'static str,
    value: T,
    velocity: T,
    target: T,
    running: bool,
    generation: u64,
    lower_bound: Option<T>,
    upper_bound: Option<T>,
    visibility_threshold: f32,
    observers: Option<StateObservers>,
}

impl<T: AnimationVector> AnimatableInner<T> {
    fn clamp(&self, value: T) -> T {
        value.map_components(|index, mut component| {
            if let Some(lower) = self.lower_bound {
                component = component.max(lower.component(index));
            }
            if let Some(upper) = self.upper_bound {
                component = component.min(upper.component(index));
            }
            component
        })
    }

    fn state(&self) -> AnimationState<T> {
        AnimationState {
            value: self.value,
            velocity: self.velocity,
        }
    }
}

/// A value that can be snapped or animated, with optional bounds.
///
/// Cloning yields another handle to the same value.
pub struct Animatable<T: AnimationVector> {
    inner: Rc<RefCell<AnimatableInner<T>>>,
}

impl<T: AnimationVector> Clone for Animatable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: AnimationVector> fmt::Debug for Animatable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Animatable")
            .field("label", &inner.label)
            .field("value", &inner.value)
            .field("target", &inner.target)
            .field("running", &inner.running)
            .finish()
    }
}

impl<T: AnimationVector> Animatable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(AnimatableInner {
                label: "Animatable",
                value: initial,
                velocity: T::zero(),
                target: initial,
                running: false,
                generation: 0,
                lower_bound: None,
                upper_bound: None,
                visibility_threshold: 0.01,
                observers: None,
            })),
        }
    }

    pub fn with_label(self, label: &'static str) -> Self {
        self.inner.borrow_mut().label = label;
        self
    }

    /// Distance under which a spring counts as arrived.
    pub fn with_visibility_threshold(self, threshold: f32) -> Self {
        self.inner.borrow_mut().visibility_threshold = threshold.abs();
        self
    }

    /// Notifies `observers` whenever the value changes.
    pub fn with_observers(self, observers: StateObservers) -> Self {
        self.inner.borrow_mut().observers = Some(observers);
        self
    }

    pub fn label(&self) -> &'static str {
        self.inner.borrow().label
    }

    pub fn value(&self) -> T {
        self.inner.borrow().value
    }

    pub fn velocity(&self) -> T {
        self.inner.borrow().velocity
    }

    /// Where the running animation is headed, or the current value when idle.
    pub fn target_value(&self) -> T {
        self.inner.borrow().target
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    pub fn lower_bound(&self) -> Option<T> {
        self.inner.borrow().lower_bound
    }

    pub fn upper_bound(&self) -> Option<T> {
        self.inner.borrow().upper_bound
    }

    pub fn state(&self) -> AnimationState<T> {
        self.inner.borrow().state()
    }

    /// Sets the value immediately, clamped to the bounds, superseding any
    /// running animation.
    pub fn snap_to(&self, value: T) {
        let observers = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            let clamped = inner.clamp(value);
            let changed = inner.value != clamped;
            inner.value = clamped;
            inner.target = clamped;
            inner.velocity = T::zero();
            inner.running = false;
            changed.then(|| inner.observers.clone()).flatten()
        };
        if let Some(observers) = observers {
            observers.notify();
        }
    }

    /// Replaces the bounds used by snaps and by animations started later.
    ///
    /// The current value is left where it is.
    pub fn update_bounds(&self, lower: Option<T>, upper: Option<T>) {
        let mut inner = self.inner.borrow_mut();
        inner.lower_bound = lower;
        inner.upper_bound = upper;
    }

    /// Animates towards `target`.
    ///
    /// The animation takes over as soon as this is called: the target is
    /// visible through [`target_value`](Self::target_value) right away and
    /// any earlier animation is superseded, even before the returned future
    /// is first polled. Without `initial_velocity` the current velocity is
    /// carried over.
    pub fn animate_to(
        &self,
        clock: &FrameClock,
        target: T,
        animation: AnimationType,
        initial_velocity: Option<T>,
    ) -> impl Future<Output = AnimationResult<T>> + 'static {
        let run = self.begin(target, initial_velocity);
        let start = run.start.value;
        let target = self.target_value();
        let threshold = self.inner.borrow().visibility_threshold;
        log::trace!("{} animating {:?} -> {:?}", self.label(), start, target);

        let step = move |play_time_nanos: u64, dt: f32, previous: AnimationState<T>| match animation {
            AnimationType::Tween(spec) => match spec.linear_progress(play_time_nanos) {
                None => (previous, false),
                Some(progress) if progress >= 1.0 => (
                    AnimationState {
                        value: target,
                        velocity: T::zero(),
                    },
                    true,
                ),
                Some(progress) => {
                    let value = start.lerp(&target, spec.easing.transform(progress));
                    let velocity = if dt > 0.0 {
                        value.map_components(|index, component| {
                            (component - previous.value.component(index)) / dt
                        })
                    } else {
                        previous.velocity
                    };
                    (AnimationState { value, velocity }, false)
                }
            },
            AnimationType::Spring(spec) => {
                let mut next = previous;
                let mut settled = true;
                for index in 0..T::SIZE {
                    let (x, v) = spec.advance(
                        previous.value.component(index),
                        previous.velocity.component(index),
                        target.component(index),
                        dt,
                    );
                    next.value.set_component(index, x);
                    next.velocity.set_component(index, v);
                    settled &= spec.is_settled(x, v, target.component(index), threshold);
                }
                if settled {
                    next = AnimationState {
                        value: target,
                        velocity: T::zero(),
                    };
                }
                (next, settled)
            }
        };

        run.drive(clock.clone(), step)
    }

    /// Lets the value coast from `initial_velocity` until the decay comes
    /// to rest or a bound stops it.
    pub fn animate_decay<D>(
        &self,
        clock: &FrameClock,
        initial_velocity: T,
        decay: D,
    ) -> impl Future<Output = AnimationResult<T>> + 'static
    where
        D: FloatDecayAnimationSpec + 'static,
    {
        let target = calculate_target_value(&decay, self.value(), initial_velocity);
        let run = self.begin(target, Some(initial_velocity));
        let start = run.start;

        let step = move |play_time_nanos: u64, _dt: f32, _previous: AnimationState<T>| {
            let mut next = start;
            let mut finished = true;
            for index in 0..T::SIZE {
                let x0 = start.value.component(index);
                let v0 = start.velocity.component(index);
                if play_time_nanos >= decay.duration_nanos(x0, v0) {
                    next.value.set_component(index, decay.target_value(x0, v0));
                    next.velocity.set_component(index, 0.0);
                } else {
                    finished = false;
                    next.value
                        .set_component(index, decay.value_from_nanos(play_time_nanos, x0, v0));
                    next.velocity
                        .set_component(index, decay.velocity_from_nanos(play_time_nanos, x0, v0));
                }
            }
            (next, finished)
        };

        run.drive(clock.clone(), step)
    }

    fn begin(&self, target: T, initial_velocity: Option<T>) -> AnimationRun<T> {
        let mut inner = self.inner.borrow_mut();
        inner.generation += 1;
        inner.target = inner.clamp(target);
        if let Some(velocity) = initial_velocity {
            inner.velocity = velocity;
        }
        inner.running = true;
        AnimationRun {
            animatable: self.clone(),
            generation: inner.generation,
            start: inner.state(),
        }
    }
}

enum Applied {
    Stale,
    Free,
    Clamped,
}

/// One animation's claim on an [`Animatable`]. Dropping it before the
/// animation ends (for example when the owning task is cancelled) leaves
/// the value where it is and marks the animatable idle.
struct AnimationRun<T: AnimationVector> {
    animatable: Animatable<T>,
    generation: u64,
    start: AnimationState<T>,
}

impl<T: AnimationVector> AnimationRun<T> {
    fn is_current(&self) -> bool {
        self.animatable.inner.borrow().generation == self.generation
    }

    fn apply(&self, next: AnimationState<T>) -> Applied {
        let (applied, observers) = {
            let mut inner = self.animatable.inner.borrow_mut();
            if inner.generation != self.generation {
                return Applied::Stale;
            }
            let clamped = inner.clamp(next.value);
            let changed = inner.value != clamped;
            inner.value = clamped;
            inner.velocity = next.velocity;
            let applied = if clamped != next.value {
                Applied::Clamped
            } else {
                Applied::Free
            };
            (applied, changed.then(|| inner.observers.clone()).flatten())
        };
        if let Some(observers) = observers {
            observers.notify();
        }
        applied
    }

    fn finish(&self, end_reason: AnimationEndReason, velocity: T) -> AnimationResult<T> {
        let mut inner = self.animatable.inner.borrow_mut();
        inner.running = false;
        inner.velocity = T::zero();
        inner.target = inner.value;
        AnimationResult {
            end_reason,
            end_state: AnimationState {
                value: inner.value,
                velocity,
            },
        }
    }

    fn superseded(&self) -> AnimationResult<T> {
        AnimationResult {
            end_reason: AnimationEndReason::Superseded,
            end_state: self.animatable.state(),
        }
    }

    async fn drive<F>(self, clock: FrameClock, mut step: F) -> AnimationResult<T>
    where
        F: FnMut(u64, f32, AnimationState<T>) -> (AnimationState<T>, bool),
    {
        let mut start_nanos = None;
        let mut last_nanos = None;
        loop {
            let frame_nanos = clock.next_frame().await;
            if !self.is_current() {
                return self.superseded();
            }
            let start = *start_nanos.get_or_insert(frame_nanos);
            let dt = last_nanos
                .map_or(0.0, |last: u64| frame_nanos.saturating_sub(last) as f32 / 1e9);
            last_nanos = Some(frame_nanos);

            let (next, finished) = step(
                frame_nanos.saturating_sub(start),
                dt,
                self.animatable.state(),
            );
            match self.apply(next) {
                Applied::Stale => return self.superseded(),
                Applied::Clamped => {
                    log::trace!("{} reached a bound", self.animatable.label());
                    return self.finish(AnimationEndReason::BoundReached, next.velocity);
                }
                Applied::Free if finished => {
                    return self.finish(AnimationEndReason::Finished, T::zero());
                }
                Applied::Free => {}
            }
        }
    }
}

impl<T: AnimationVector> Drop for AnimationRun<T> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.animatable.inner.try_borrow_mut() {
            if inner.generation == self.generation && inner.running {
                inner.running = false;
                inner.velocity = T::zero();
                inner.target = inner.value;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/animatable_tests.rs"]
mod tests;
