//! The viewer state machine.
//!
//! [`LightboxState`] owns the animated properties of the viewer and decides,
//! from the transform gestures it is fed, which of the mutually exclusive
//! motions is in progress and how it resolves when the fingers lift.
//!
//! Operations that animate launch a task on the attached runtime. Every
//! animation target is recorded before the call returns, so readers see
//! where the viewer is heading right away. Without a runtime the same
//! operations jump straight to their end state.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures_util::future::{join, join3};
use lightbox_animation::{
    calculate_target_value, Animatable, AnimationEndReason, AnimationSpec, AnimationType,
    SplineBasedDecaySpec,
};
use lightbox_core::{
    FrameClock, MutableState, RuntimeHandle, StateObservers, Subscription, TaskHandle,
};
use lightbox_ui_graphics::{LayoutDirection, Offset, Rect, Size, Velocity};

use crate::config::LightboxConfig;
use crate::motion::{self, Motion};
use crate::photo::PhotoRef;

/// The photos a viewer pages through.
pub type PhotoList = Rc<[PhotoRef]>;

/// Pan changes below half a pixel are invisible.
const PAN_VISIBILITY_THRESHOLD: f32 = 0.5;
const PROGRESS_VISIBILITY_THRESHOLD: f32 = 0.01;

struct StateInner {
    config: LightboxConfig,
    observers: StateObservers,
    photo_list: MutableState<Option<PhotoList>>,
    current_index: MutableState<usize>,
    open: MutableState<bool>,
    hud_visible: MutableState<bool>,
    minimal_zoom: MutableState<bool>,
    motion: MutableState<Motion>,
    /// Bumped whenever a gesture or a slide takes over `motion`; a task may
    /// only end the motion it was launched for.
    motion_owner: Cell<u64>,
    /// Set between the first delta of a gesture and its release.
    gesture_active: Cell<bool>,
    scale: Animatable<f32>,
    pan: Animatable<Offset>,
    dismiss_progress: Animatable<f32>,
    closing_progress: Animatable<f32>,
    viewport: Cell<Size>,
    density: Cell<f32>,
    layout_direction: Cell<LayoutDirection>,
    decay: Cell<SplineBasedDecaySpec>,
    runtime: RefCell<Option<RuntimeHandle>>,
    tasks: RefCell<Vec<TaskHandle>>,
}

/// How a gesture resolves once the fingers lift.
#[derive(Debug)]
enum Release {
    Dismiss {
        exit: Offset,
        velocity: Offset,
    },
    Navigate {
        photo: PhotoRef,
        list: PhotoList,
        index: usize,
        velocity: Offset,
    },
    Settle,
    Fling {
        velocity: Offset,
        limits: Offset,
    },
}

/// Runs its action when dropped, so cleanup also happens for tasks that are
/// canceled before or while they run.
struct OnDrop<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> Drop for OnDrop<F> {
    fn drop(&mut self) {
        if let Some(action) = self.0.take() {
            action();
        }
    }
}

/// State of one lightbox viewer.
///
/// Cloning yields another handle to the same viewer.
#[derive(Clone)]
pub struct LightboxState {
    inner: Rc<StateInner>,
}

impl Default for LightboxState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LightboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightboxState")
            .field("open", &self.is_open())
            .field("current_index", &self.current_index())
            .field("photos", &self.photo_list().map(|list| list.len()))
            .field("motion", &self.motion())
            .field("scale", &self.scale())
            .field("pan", &self.pan())
            .field("dismiss_progress", &self.dismiss_progress())
            .field("closing_progress", &self.closing_progress())
            .finish()
    }
}

impl LightboxState {
    pub fn new() -> Self {
        Self::with_config(LightboxConfig::default())
    }

    pub fn with_config(config: LightboxConfig) -> Self {
        let observers = StateObservers::new();
        let progress = |label| {
            Animatable::new(0.0f32)
                .with_label(label)
                .with_visibility_threshold(PROGRESS_VISIBILITY_THRESHOLD)
                .with_observers(observers.clone())
        };
        let inner = StateInner {
            config,
            photo_list: MutableState::new(None, observers.clone()),
            current_index: MutableState::new(0, observers.clone()),
            open: MutableState::new(false, observers.clone()),
            hud_visible: MutableState::new(true, observers.clone()),
            minimal_zoom: MutableState::new(true, observers.clone()),
            motion: MutableState::new(Motion::None, observers.clone()),
            motion_owner: Cell::new(0),
            gesture_active: Cell::new(false),
            scale: Animatable::new(1.0f32)
                .with_label("scale")
                .with_visibility_threshold(PROGRESS_VISIBILITY_THRESHOLD)
                .with_observers(observers.clone()),
            pan: Animatable::new(Offset::ZERO)
                .with_label("pan")
                .with_visibility_threshold(PAN_VISIBILITY_THRESHOLD)
                .with_observers(observers.clone()),
            dismiss_progress: progress("dismiss_progress"),
            closing_progress: progress("closing_progress"),
            viewport: Cell::new(Size::ZERO),
            density: Cell::new(1.0),
            layout_direction: Cell::new(LayoutDirection::Ltr),
            decay: Cell::new(SplineBasedDecaySpec::new(1.0)),
            runtime: RefCell::new(None),
            tasks: RefCell::new(Vec::new()),
            observers,
        };
        Self {
            inner: Rc::new(inner),
        }
    }

    pub fn config(&self) -> &LightboxConfig {
        &self.inner.config
    }

    /// Calls `callback` after every change of an observable field. Changes
    /// made by one operation are reported once.
    #[must_use = "dropping the subscription unregisters the observer"]
    pub fn observe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.inner.observers.observe(callback)
    }

    pub fn photo_list(&self) -> Option<PhotoList> {
        self.inner.photo_list.get()
    }

    /// Index into [`photo_list`](Self::photo_list); meaningless without a list.
    pub fn current_index(&self) -> usize {
        self.inner.current_index.get()
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.get()
    }

    pub fn hud_visible(&self) -> bool {
        self.inner.hud_visible.get()
    }

    pub fn set_hud_visible(&self, visible: bool) {
        self.inner.hud_visible.set(visible);
    }

    pub fn toggle_hud(&self) {
        self.set_hud_visible(!self.hud_visible());
    }

    pub fn motion(&self) -> Motion {
        self.inner.motion.get()
    }

    /// True when gestures navigate or dismiss instead of panning.
    pub fn is_minimal_zoom(&self) -> bool {
        self.inner.minimal_zoom.get()
    }

    pub fn scale(&self) -> f32 {
        self.inner.scale.value()
    }

    pub fn scale_target(&self) -> f32 {
        self.inner.scale.target_value()
    }

    /// Translation of the photo, applied before scaling.
    pub fn pan(&self) -> Offset {
        self.inner.pan.value()
    }

    pub fn pan_target(&self) -> Offset {
        self.inner.pan.target_value()
    }

    pub fn dismiss_progress(&self) -> f32 {
        self.inner.dismiss_progress.value()
    }

    pub fn closing_progress(&self) -> f32 {
        self.inner.closing_progress.value()
    }

    pub fn is_animating(&self) -> bool {
        let inner = &self.inner;
        inner.scale.is_running()
            || inner.pan.is_running()
            || inner.dismiss_progress.is_running()
            || inner.closing_progress.is_running()
    }

    pub fn viewport_size(&self) -> Size {
        self.inner.viewport.get()
    }

    pub fn density(&self) -> f32 {
        self.inner.density.get()
    }

    pub fn layout_direction(&self) -> LayoutDirection {
        self.inner.layout_direction.get()
    }

    pub fn set_viewport_size(&self, size: Size) {
        self.inner.viewport.set(size);
    }

    /// Updates the display density; fling friction depends on it.
    pub fn set_density(&self, density: f32) {
        if !(density.is_finite() && density > 0.0) {
            log::warn!("ignoring invalid density {density}");
            return;
        }
        if density != self.inner.density.get() {
            self.inner.density.set(density);
            self.inner.decay.set(SplineBasedDecaySpec::new(density));
        }
    }

    pub fn set_layout_direction(&self, direction: LayoutDirection) {
        self.inner.layout_direction.set(direction);
    }

    /// Lets animating operations run as tasks on `runtime`.
    pub fn attach(&self, runtime: RuntimeHandle) {
        *self.inner.runtime.borrow_mut() = Some(runtime);
    }

    /// Cancels every task this state launched and forgets the runtime.
    /// Later operations apply their end state immediately.
    pub fn detach(&self) {
        self.inner.runtime.borrow_mut().take();
        let tasks = std::mem::take(&mut *self.inner.tasks.borrow_mut());
        let mut canceled = 0;
        for task in tasks {
            if task.is_active() {
                canceled += 1;
            }
            task.cancel();
        }
        log::debug!("detached, {canceled} tasks canceled");
        self.cancel_gesture();
    }

    pub fn is_attached(&self) -> bool {
        self.inner
            .runtime
            .borrow()
            .as_ref()
            .is_some_and(RuntimeHandle::is_alive)
    }

    pub fn has_previous(&self) -> bool {
        self.photo_list().is_some() && self.current_index() > 0
    }

    pub fn has_next(&self) -> bool {
        self.photo_list()
            .is_some_and(|list| self.current_index() + 1 < list.len())
    }

    pub fn current_photo(&self) -> Option<PhotoRef> {
        self.photo_at(Some(self.current_index()))
    }

    pub fn previous_photo(&self) -> Option<PhotoRef> {
        self.photo_at(self.current_index().checked_sub(1))
    }

    pub fn next_photo(&self) -> Option<PhotoRef> {
        self.photo_at(self.current_index().checked_add(1))
    }

    fn photo_at(&self, index: Option<usize>) -> Option<PhotoRef> {
        let list = self.photo_list()?;
        list.get(index?).cloned()
    }

    /// Index of the photo in view, fractional while a change drag moves
    /// between two photos.
    pub fn current_index_fraction(&self) -> f32 {
        let index = self.current_index() as f32;
        if self.motion() != Motion::Change {
            return index;
        }
        let fraction = self.pan().x / self.viewport_size().width;
        if fraction.is_finite() {
            index - fraction
        } else {
            index
        }
    }

    /// True while a change drag pulls past the first or last photo.
    pub fn is_overscrolling(&self) -> bool {
        if self.motion() != Motion::Change {
            return false;
        }
        let pan_x = self.pan().x;
        (pan_x > 0.0 && !self.has_previous()) || (pan_x < 0.0 && !self.has_next())
    }

    /// Applies one transform delta of a gesture in progress.
    ///
    /// The first delta that leaves the motion threshold at minimal zoom
    /// commits the gesture to dismiss or change; pinches and drags of a
    /// zoomed photo pan. The mode holds until the gesture ends.
    pub fn drag_in_progress(&self, zoom_change: f32, pan_change: Offset) {
        let inner = &self.inner;
        let pan_change = self.mirrored(pan_change);
        if !inner.gesture_active.replace(true) {
            // Whatever mode is still settling now belongs to this gesture.
            self.take_motion();
        }
        inner.observers.batch(|| {
            let mut motion = inner.motion.get();
            if zoom_change != 1.0 && motion == Motion::None {
                motion = Motion::Pan;
            }
            if motion == Motion::Pan && zoom_change.is_finite() && zoom_change > 0.0 {
                let scale = (inner.scale.value() * zoom_change).max(inner.config.scale_floor());
                inner.scale.snap_to(scale);
            }
            if inner.minimal_zoom.get() && motion == Motion::None {
                let threshold = inner.config.motion_threshold.to_px(inner.density.get());
                motion = motion::select_motion(pan_change, threshold);
                inner.pan.snap_to(Offset::ZERO);
                if motion != Motion::None {
                    log::debug!("gesture committed to {motion:?}");
                }
            } else if !inner.minimal_zoom.get() {
                motion = Motion::Pan;
            }
            inner.motion.set(motion);

            let pan = inner.pan.value();
            match motion {
                Motion::Dismiss => {
                    let y = pan.y + pan_change.y;
                    inner.pan.snap_to(Offset::new(0.0, y));
                    inner.dismiss_progress.snap_to(self.dismiss_for_pan(y));
                }
                Motion::Change => inner.pan.snap_to(Offset::new(pan.x + pan_change.x, 0.0)),
                Motion::Pan => inner.pan.snap_to(pan + pan_change),
                Motion::None => {}
            }
        });
    }

    /// Resolves the gesture that just ended, given the release velocity in
    /// pixels per second.
    pub fn transform_ended(&self, velocity: Velocity) {
        self.inner.gesture_active.set(false);
        let velocity = self.mirrored(velocity.to_offset());
        let release = self.resolve_release(velocity);
        log::debug!("gesture released: {release:?}");
        let inner = &self.inner;

        match release {
            Release::Dismiss { exit, velocity } => {
                inner.open.set(false);
                let spec = AnimationSpec::linear(inner.config.dismiss_duration_millis);
                let launched = self.launch(|clock| {
                    let idle = self.motion_guard();
                    let clear = self.deferred(Self::clear_list_if_closed);
                    let fly_out = inner.pan.animate_to(&clock, exit, spec.into(), Some(velocity));
                    async move {
                        let _guards = (idle, clear);
                        fly_out.await;
                    }
                });
                if !launched {
                    inner.observers.batch(|| {
                        inner.pan.snap_to(exit);
                        self.clear_list_if_closed();
                        inner.motion.set(Motion::None);
                    });
                }
            }
            Release::Navigate {
                photo,
                list,
                index,
                velocity,
            } => self.show(&photo, list, index, None, velocity),
            Release::Settle => {
                inner.hud_visible.set(true);
                let launched = self.launch(|clock| {
                    let idle = self.motion_guard();
                    let spring = AnimationType::spring();
                    let settle = join3(
                        inner.scale.animate_to(&clock, 1.0, spring, None),
                        inner.pan.animate_to(&clock, Offset::ZERO, spring, None),
                        inner.dismiss_progress.animate_to(&clock, 0.0, spring, None),
                    );
                    async move {
                        let _idle = idle;
                        settle.await;
                    }
                });
                if !launched {
                    inner.observers.batch(|| {
                        self.snap_to_rest();
                        inner.dismiss_progress.snap_to(0.0);
                        inner.motion.set(Motion::None);
                    });
                }
            }
            Release::Fling { velocity, limits } => {
                inner.dismiss_progress.snap_to(0.0);
                inner.pan.update_bounds(Some(-limits), Some(limits));
                let decay = inner.decay.get();
                let launched = self.launch(|clock| {
                    let idle = self.motion_guard();
                    let unbound = self.deferred(Self::clear_pan_bounds);
                    let pan = inner.pan.clone();
                    let fling = pan.animate_decay(&clock, velocity, decay);
                    async move {
                        let _guards = (idle, unbound);
                        let result = fling.await;
                        if result.end_reason != AnimationEndReason::BoundReached
                            || !result.end_state.velocity.is_finite()
                        {
                            return;
                        }
                        // Keep coasting along the axis that did not hit its bound.
                        let stopped = result.end_state.value;
                        let speed = result.end_state.velocity;
                        let residual = if stopped.x.abs() == limits.x {
                            Offset::new(0.0, speed.y)
                        } else if stopped.y.abs() == limits.y {
                            Offset::new(speed.x, 0.0)
                        } else {
                            return;
                        };
                        pan.animate_decay(&clock, residual, decay).await;
                    }
                });
                if !launched {
                    let target = calculate_target_value(&decay, inner.pan.value(), velocity);
                    inner.observers.batch(|| {
                        inner.pan.snap_to(target);
                        self.clear_pan_bounds();
                        inner.motion.set(Motion::None);
                    });
                }
            }
        }
    }

    fn resolve_release(&self, velocity: Offset) -> Release {
        let inner = &self.inner;
        let config = &inner.config;
        let viewport = inner.viewport.get();
        let motion = inner.motion.get();
        let scale_target = inner.scale.target_value();
        let content_velocity = velocity / scale_target.max(1.0);
        let projected = calculate_target_value(
            &inner.decay.get(),
            inner.pan.target_value(),
            content_velocity,
        );

        if motion == Motion::Dismiss && self.dismiss_for_pan(projected.y) >= 1.0 {
            let direction = if projected.y < 0.0 { -1.0 } else { 1.0 };
            return Release::Dismiss {
                exit: Offset::new(
                    0.0,
                    direction * config.dismiss_offscreen_factor * viewport.height,
                ),
                velocity: Offset::new(0.0, velocity.y),
            };
        }

        let minimal = scale_target <= 1.0;
        inner.minimal_zoom.set(minimal);

        if motion == Motion::Change {
            let threshold = viewport.width * config.navigate_fraction;
            let step = if projected.x < -threshold {
                Some(1)
            } else if projected.x > threshold {
                Some(-1)
            } else {
                None
            };
            if let Some((photo, list, index)) = step.and_then(|step| self.neighbour(step)) {
                return Release::Navigate {
                    photo,
                    list,
                    index,
                    velocity,
                };
            }
        }

        if minimal {
            Release::Settle
        } else {
            let aspect_ratio = self.current_photo().and_then(|photo| photo.aspect_ratio());
            Release::Fling {
                velocity: content_velocity,
                limits: motion::pan_limits(viewport, aspect_ratio),
            }
        }
    }

    /// Shows `photo`, one of `list`.
    ///
    /// An empty `list` shows `photo` alone. When `source_bounds` is given,
    /// the photo grows out of that rectangle of the viewport.
    ///
    /// # Panics
    ///
    /// Panics when `list` is not empty and does not contain `photo`.
    pub fn open(&self, photo: &PhotoRef, list: impl Into<PhotoList>, source_bounds: Option<Rect>) {
        let list = list.into();
        let index = if list.is_empty() {
            0
        } else {
            match list.iter().position(|item| item.url() == photo.url()) {
                Some(index) => index,
                None => panic!(
                    "photo {} is not part of the {} photos it was opened with",
                    photo.url(),
                    list.len()
                ),
            }
        };
        self.show(photo, list, index, source_bounds, Offset::ZERO);
    }

    pub fn go_next(&self) {
        if let Some((photo, list, index)) = self.neighbour(1) {
            self.show(&photo, list, index, None, Offset::ZERO);
        }
    }

    pub fn go_previous(&self) {
        if let Some((photo, list, index)) = self.neighbour(-1) {
            self.show(&photo, list, index, None, Offset::ZERO);
        }
    }

    fn neighbour(&self, step: isize) -> Option<(PhotoRef, PhotoList, usize)> {
        let list = self.photo_list()?;
        let index = self.current_index().checked_add_signed(step)?;
        let photo = list.get(index)?.clone();
        Some((photo, list, index))
    }

    fn show(
        &self,
        photo: &PhotoRef,
        list: PhotoList,
        index: usize,
        source_bounds: Option<Rect>,
        velocity: Offset,
    ) {
        let inner = &self.inner;
        let list: PhotoList = if list.is_empty() {
            Rc::from(vec![Rc::clone(photo)])
        } else {
            list
        };
        inner.observers.batch(|| {
            inner.dismiss_progress.snap_to(0.0);
            inner.closing_progress.snap_to(0.0);
            if self.is_adjacent_on_same_list(&list, index) {
                self.slide_to(index, velocity);
            } else {
                self.present(list, index, source_bounds);
            }
        });
    }

    fn is_adjacent_on_same_list(&self, list: &PhotoList, index: usize) -> bool {
        if !self.is_open() {
            return false;
        }
        let Some(current_list) = self.photo_list() else {
            return false;
        };
        let same_list = Rc::ptr_eq(&current_list, list)
            || (current_list.len() == list.len()
                && current_list
                    .iter()
                    .zip(list.iter())
                    .all(|(a, b)| a.url() == b.url()));
        same_list && self.current_index().abs_diff(index) == 1
    }

    /// Slides the current photo out and its neighbour at `index` in.
    fn slide_to(&self, index: usize, velocity: Offset) {
        let inner = &self.inner;
        let current = inner.current_index.get();
        log::debug!("navigating from photo {current} to {index}");
        inner.motion.set(Motion::Change);
        self.take_motion();
        let width = inner.viewport.get().width;
        let offscreen = Offset::new((current as f32 - index as f32) * width, 0.0);

        let launched = self.launch(|clock| {
            let idle = self.motion_guard();
            let spring = AnimationType::spring();
            let slide = join(
                inner.scale.animate_to(&clock, 1.0, spring, None),
                inner.pan.animate_to(&clock, offscreen, spring, Some(Offset::new(velocity.x, 0.0))),
            );
            let state = self.clone();
            async move {
                let _idle = idle;
                let (scale, pan) = slide.await;
                if !scale.is_superseded() && !pan.is_superseded() {
                    state.commit_slide(index);
                }
            }
        });
        if !launched {
            inner.scale.snap_to(1.0);
            self.commit_slide(index);
        }
    }

    fn commit_slide(&self, index: usize) {
        let inner = &self.inner;
        inner.observers.batch(|| {
            inner.current_index.set(index);
            inner.minimal_zoom.set(true);
            inner.motion.set(Motion::None);
            inner.pan.snap_to(Offset::ZERO);
        });
    }

    /// Opens the viewer on `list[index]`.
    fn present(&self, list: PhotoList, index: usize, source_bounds: Option<Rect>) {
        let inner = &self.inner;
        let entry = source_bounds.and_then(|bounds| {
            motion::source_transform(bounds, inner.viewport.get(), inner.config.scale_floor())
        });
        match entry {
            Some((scale, pan)) => {
                inner.scale.snap_to(scale);
                inner.pan.snap_to(pan);
            }
            None => self.snap_to_rest(),
        }
        log::debug!("opening photo {index} of {}", list.len());
        inner.photo_list.set(Some(list));
        inner.current_index.set(index);
        inner.minimal_zoom.set(true);
        inner.motion.set(Motion::None);
        inner.open.set(true);

        if entry.is_none() {
            return;
        }
        let spec = AnimationType::tween(inner.config.entry_duration_millis);
        let launched = self.launch(|clock| {
            let entry = join(
                inner.scale.animate_to(&clock, 1.0, spec, None),
                inner.pan.animate_to(&clock, Offset::ZERO, spec, None),
            );
            async move {
                entry.await;
            }
        });
        if !launched {
            self.snap_to_rest();
        }
    }

    /// Starts the exit transition. Does nothing when already closed.
    pub fn close(&self) {
        let inner = &self.inner;
        if !inner.open.get() {
            return;
        }
        log::debug!("closing");
        inner.open.set(false);
        let shrunk = inner.scale.target_value() * inner.config.close_scale;
        let launched = self.launch(|clock| {
            let clear = self.deferred(Self::clear_list_if_closed);
            let spring = AnimationType::spring();
            let exit = join(
                inner.closing_progress.animate_to(&clock, 1.0, spring, None),
                inner.scale.animate_to(&clock, shrunk, spring, None),
            );
            async move {
                let _clear = clear;
                exit.await;
            }
        });
        if !launched {
            inner.observers.batch(|| {
                inner.closing_progress.snap_to(1.0);
                inner.scale.snap_to(shrunk);
                self.clear_list_if_closed();
            });
        }
    }

    /// Zooms in around `point` (viewport coordinates), or back out when
    /// already zoomed in.
    pub fn on_double_tap(&self, point: Offset) {
        let inner = &self.inner;
        let config = &inner.config;
        let zoomed_in = inner.scale.value() > config.zoom_out_threshold;
        let (scale, pan, spec) = if zoomed_in {
            (1.0, Offset::ZERO, AnimationType::spring())
        } else {
            let towards = self.mirrored(inner.viewport.get().center() - point);
            (
                inner.scale.target_value() * config.double_tap_zoom,
                towards,
                AnimationType::tween(config.double_tap_duration_millis),
            )
        };
        log::debug!("double tap: scale -> {scale}");

        inner.observers.batch(|| {
            inner.minimal_zoom.set(zoomed_in);
            inner.hud_visible.set(zoomed_in);
            let launched = self.launch(|clock| {
                let zoom = join(
                    inner.scale.animate_to(&clock, scale, spec, None),
                    inner.pan.animate_to(&clock, pan, spec, None),
                );
                async move {
                    zoom.await;
                }
            });
            if !launched {
                inner.scale.snap_to(scale);
                inner.pan.snap_to(pan);
            }
        });
    }

    /// Follows a predictive back gesture; `progress` runs from 0 to 1.
    pub fn on_back_progress(&self, progress: f32) {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.inner
            .dismiss_progress
            .snap_to((2.0 * progress).min(1.0).sqrt());
    }

    pub fn on_back_committed(&self) {
        self.close();
    }

    pub fn on_back_cancelled(&self) {
        self.cancel_gesture();
    }

    /// Abandons the gesture in progress without resolving it.
    pub fn cancel_gesture(&self) {
        let inner = &self.inner;
        inner.gesture_active.set(false);
        self.take_motion();
        inner.observers.batch(|| {
            inner.dismiss_progress.snap_to(0.0);
            inner.motion.set(Motion::None);
        });
    }

    /// Shows `list[index]` at rest, as after a process restart.
    pub(crate) fn restore_presented(&self, list: PhotoList, index: usize) {
        let inner = &self.inner;
        inner.observers.batch(|| {
            self.snap_to_rest();
            inner.dismiss_progress.snap_to(0.0);
            inner.closing_progress.snap_to(0.0);
            inner.photo_list.set(Some(list));
            inner.current_index.set(index);
            inner.minimal_zoom.set(true);
            inner.motion.set(Motion::None);
            inner.open.set(true);
        });
    }

    fn snap_to_rest(&self) {
        self.inner.scale.snap_to(1.0);
        self.inner.pan.snap_to(Offset::ZERO);
    }

    fn take_motion(&self) {
        let owner = &self.inner.motion_owner;
        owner.set(owner.get().wrapping_add(1));
    }

    /// Ends the current motion on drop, unless a later gesture or slide has
    /// taken it over by then.
    fn motion_guard(&self) -> OnDrop<impl FnOnce()> {
        let owner = self.inner.motion_owner.get();
        let state = self.clone();
        OnDrop(Some(move || {
            if state.inner.motion_owner.get() == owner {
                state.inner.motion.set(Motion::None);
            }
        }))
    }

    fn clear_pan_bounds(&self) {
        self.inner.pan.update_bounds(None, None);
    }

    /// A viewer reopened while its exit was still animating keeps its list.
    fn clear_list_if_closed(&self) {
        if !self.inner.open.get() {
            self.inner.photo_list.set(None);
        }
    }

    /// Dismiss progress for a vertical pan; 0 for a viewport without height.
    fn dismiss_for_pan(&self, pan_y: f32) -> f32 {
        let progress = motion::dismiss_for_pan(
            pan_y,
            self.inner.viewport.get().height,
            self.inner.config.dismiss_ramp,
        );
        if progress.is_nan() {
            0.0
        } else {
            progress
        }
    }

    fn mirrored(&self, offset: Offset) -> Offset {
        if self.inner.layout_direction.get().is_rtl() {
            Offset::new(-offset.x, offset.y)
        } else {
            offset
        }
    }

    fn deferred(&self, action: fn(&LightboxState)) -> OnDrop<impl FnOnce()> {
        let state = self.clone();
        OnDrop(Some(move || action(&state)))
    }

    /// Spawns the future built by `start` on the attached runtime. Returns
    /// false, without calling `start`, when detached.
    fn launch<Fut>(&self, start: impl FnOnce(FrameClock) -> Fut) -> bool
    where
        Fut: Future<Output = ()> + 'static,
    {
        let runtime = match self.inner.runtime.borrow().as_ref() {
            Some(runtime) if runtime.is_alive() => runtime.clone(),
            _ => return false,
        };
        let Some(task) = runtime.spawn_ui(start(runtime.frame_clock())) else {
            return false;
        };
        let mut tasks = self.inner.tasks.borrow_mut();
        tasks.retain(TaskHandle::is_active);
        tasks.push(task);
        true
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
