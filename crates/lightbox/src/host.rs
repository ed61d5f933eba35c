//! Glue between a viewer surface and its [`LightboxState`].
//!
//! The host owns the gesture recognizers, forwards layout facts and raw
//! pointer input to the state, pumps the runtime and turns the state into a
//! [`LightboxFrame`] of numbers a renderer can draw.

use lightbox_core::RuntimeHandle;
use lightbox_foundation::{
    PointerEvent, TapEvent, TapGestureDetector, TransformEvent, TransformGestureDetector,
    ViewConfiguration,
};
use lightbox_ui_graphics::{LayoutDirection, Offset, Size};
use web_time::Instant;

use crate::motion::Motion;
use crate::photo::PhotoRef;
use crate::state::LightboxState;

/// What to draw for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LightboxFrame {
    pub open: bool,
    pub current: Option<PhotoRef>,
    pub previous: Option<PhotoRef>,
    pub next: Option<PhotoRef>,
    pub image_scale: f32,
    pub image_alpha: f32,
    /// Translation of the current photo, applied before `image_scale`.
    pub image_offset: Offset,
    pub scrim_alpha: f32,
    /// Horizontal offsets of the neighbouring photos.
    pub previous_offset_x: f32,
    pub next_offset_x: f32,
    pub hud_visible: bool,
    pub hide_system_ui: bool,
    pub current_index_fraction: f32,
    pub overscrolling: bool,
}

/// Drives one viewer surface.
///
/// Pointer uptimes and frame times must come from the same clock. Dropping
/// the host detaches the state.
pub struct LightboxHost {
    state: LightboxState,
    runtime: RuntimeHandle,
    transform: TransformGestureDetector,
    taps: TapGestureDetector,
    /// Set between `Started` and `Stopped` of a transform gesture.
    transforming: bool,
    epoch: Instant,
}

impl LightboxHost {
    pub fn mount(state: LightboxState, runtime: RuntimeHandle) -> Self {
        state.attach(runtime.clone());
        let config = ViewConfiguration::for_density(state.density());
        Self {
            state,
            runtime,
            transform: TransformGestureDetector::new(config),
            taps: TapGestureDetector::new(config),
            transforming: false,
            epoch: Instant::now(),
        }
    }

    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    pub fn on_layout(&mut self, size: Size, density: f32, direction: LayoutDirection) {
        self.state.set_viewport_size(size);
        self.state.set_layout_direction(direction);
        if density != self.state.density() {
            self.state.set_density(density);
            let config = ViewConfiguration::for_density(self.state.density());
            self.transform.set_view_configuration(config);
            self.taps.set_view_configuration(config);
        }
    }

    pub fn on_pointer_event(&mut self, event: &PointerEvent) {
        if self.state.current_photo().is_none() {
            return;
        }
        for gesture in self.transform.on_pointer_event(event) {
            self.on_transform(gesture);
        }
        for tap in self.taps.on_pointer_event(event) {
            self.on_tap(tap);
        }
        self.runtime.drain_ui();
    }

    /// Abandons the pointer session in progress, as when the platform steals
    /// the touch stream.
    ///
    /// A transform already past the slop resolves as if released, with the
    /// velocity tracked so far; the viewer is not closed. Closing on a
    /// platform cancel goes through [`on_back_committed`](Self::on_back_committed).
    pub fn cancel_input(&mut self) {
        if let Some(gesture) = self.transform.cancel() {
            self.on_transform(gesture);
        }
        self.taps.cancel();
        self.runtime.drain_ui();
    }

    fn on_transform(&mut self, gesture: TransformEvent) {
        match gesture {
            TransformEvent::Started => {
                log::trace!("transform started");
                self.transforming = true;
            }
            TransformEvent::Delta {
                zoom_change,
                pan_change,
            } if self.transforming => {
                // Pointer deltas are in viewport pixels, pan is in photo pixels.
                let scale = self.state.scale();
                let pan_change = if scale > 0.0 {
                    pan_change / scale
                } else {
                    pan_change
                };
                self.state.drag_in_progress(zoom_change, pan_change);
            }
            TransformEvent::Delta { .. } => {}
            TransformEvent::Stopped { velocity } => {
                if std::mem::take(&mut self.transforming) {
                    self.state.transform_ended(velocity);
                }
            }
        }
    }

    fn on_tap(&self, tap: TapEvent) {
        match tap {
            TapEvent::Tap(_) => self.state.toggle_hud(),
            TapEvent::DoubleTap(position) => self.state.on_double_tap(position),
        }
    }

    /// Runs the frame at `now_nanos`: animations step, ready tasks run and a
    /// single tap whose double-tap window closed is delivered.
    pub fn on_frame(&mut self, now_nanos: u64) {
        self.runtime.run_frame(now_nanos);
        if let Some(tap) = self.taps.poll(now_nanos / 1_000_000) {
            self.on_tap(tap);
        }
        self.runtime.drain_ui();
    }

    /// [`on_frame`](Self::on_frame) with the host's own clock.
    pub fn on_frame_now(&mut self) {
        let now = self.uptime_nanos();
        self.on_frame(now);
    }

    /// Time since the host was mounted, the clock `on_frame_now` uses.
    pub fn uptime_nanos(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    pub fn uptime_millis(&self) -> u64 {
        self.uptime_nanos() / 1_000_000
    }

    /// True while the state has work for upcoming frames.
    pub fn needs_frame(&self) -> bool {
        self.runtime.needs_frame() || self.taps.has_pending_tap()
    }

    pub fn on_back_progress(&self, progress: f32) {
        self.state.on_back_progress(progress);
    }

    pub fn on_back_committed(&self) {
        self.state.on_back_committed();
        self.runtime.drain_ui();
    }

    pub fn on_back_cancelled(&self) {
        self.state.on_back_cancelled();
    }

    pub fn frame(&self) -> LightboxFrame {
        let state = &self.state;
        let config = state.config();
        let dismiss = state.dismiss_progress();
        let width = state.viewport_size().width;
        let rtl = state.layout_direction().is_rtl();
        let pan = state.pan();

        let drag_x = if state.motion() == Motion::Change {
            pan.x
        } else {
            0.0
        };
        let mirror = |x: f32| if rtl { -x } else { x };
        let open = state.is_open();
        let hud_visible = state.hud_visible();

        LightboxFrame {
            open,
            current: state.current_photo(),
            previous: state.previous_photo(),
            next: state.next_photo(),
            image_scale: state.scale() * (1.0 - config.dismiss_shrink * dismiss),
            image_alpha: 1.0 - state.closing_progress(),
            image_offset: Offset::new(mirror(pan.x), pan.y),
            scrim_alpha: 1.0 - config.dismiss_scrim_fade * dismiss,
            previous_offset_x: mirror(drag_x - width),
            next_offset_x: mirror(drag_x + width),
            hud_visible,
            hide_system_ui: open && !hud_visible,
            current_index_fraction: state.current_index_fraction(),
            overscrolling: state.is_overscrolling(),
        }
    }
}

impl Drop for LightboxHost {
    fn drop(&mut self) {
        self.state.detach();
    }
}

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod tests;
