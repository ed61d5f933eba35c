//! Pinch/pan recognition.
//!
//! [`TransformGestureDetector`] turns the pointer events of one gesture
//! session into [`TransformEvent`]s. Nothing is reported until the combined
//! zoom and pan motion exceeds the touch slop, so short presses stay
//! available as taps. Past the slop every moving change is consumed.

use smallvec::SmallVec;

use lightbox_ui_graphics::{Offset, Velocity};

use crate::gesture_constants::ViewConfiguration;
use crate::input::PointerEvent;
use crate::velocity_tracker::VelocityTracker;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformEvent {
    /// The session moved past the touch slop.
    Started,
    Delta { zoom_change: f32, pan_change: Offset },
    /// The session ended; `velocity` is the release velocity in px/s.
    Stopped { velocity: Velocity },
}

pub type TransformEvents = SmallVec<[TransformEvent; 2]>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Pointers are down but the slop has not been exceeded.
    Tracking { zoom: f32, pan: Offset },
    Transforming,
}

#[derive(Debug, Clone)]
pub struct TransformGestureDetector {
    config: ViewConfiguration,
    tracker: VelocityTracker,
    phase: Phase,
}

impl Default for TransformGestureDetector {
    fn default() -> Self {
        Self::new(ViewConfiguration::default())
    }
}

impl TransformGestureDetector {
    pub fn new(config: ViewConfiguration) -> Self {
        Self {
            config,
            tracker: VelocityTracker::new(),
            phase: Phase::Idle,
        }
    }

    pub fn view_configuration(&self) -> ViewConfiguration {
        self.config
    }

    /// Takes effect from the next session's slop check.
    pub fn set_view_configuration(&mut self, config: ViewConfiguration) {
        self.config = config;
    }

    /// True while a session is in progress.
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_transforming(&self) -> bool {
        self.phase == Phase::Transforming
    }

    pub fn on_pointer_event(&mut self, event: &PointerEvent) -> TransformEvents {
        let mut out = TransformEvents::new();

        if self.phase == Phase::Idle {
            if event
                .changes
                .iter()
                .any(|change| change.changed_to_down_ignore_consumed())
            {
                log::trace!("transform session started");
                self.tracker.reset();
                if let Some(change) = event.main_pointer() {
                    self.tracker.add_pointer_input_change(change);
                }
                self.phase = Phase::Tracking {
                    zoom: 1.0,
                    pan: Offset::ZERO,
                };
            }
            return out;
        }

        // Someone else claimed the input.
        if event.is_consumed() {
            out.extend(self.cancel());
            return out;
        }

        let zoom_change = event.calculate_zoom();
        let pan_change = event.calculate_pan();
        if zoom_change == 1.0 {
            if let Some(change) = event.main_pointer() {
                self.tracker.add_pointer_input_change(change);
            }
        }

        if let Phase::Tracking { zoom, pan } = self.phase {
            let zoom = zoom * zoom_change;
            let pan = pan + pan_change;
            let zoom_motion = (1.0 - zoom).abs() * event.calculate_centroid_size(false);
            let pan_motion = pan.distance();
            if zoom_motion > self.config.touch_slop || pan_motion > self.config.touch_slop {
                log::trace!("transform past touch slop");
                self.phase = Phase::Transforming;
                out.push(TransformEvent::Started);
            } else {
                self.phase = Phase::Tracking { zoom, pan };
            }
        }

        if self.phase == Phase::Transforming {
            if zoom_change != 1.0 || pan_change != Offset::ZERO {
                out.push(TransformEvent::Delta {
                    zoom_change,
                    pan_change,
                });
            }
            for change in event.changes.iter().filter(|change| change.position_changed()) {
                change.consume();
            }
        }

        if !event.any_pressed() {
            out.push(self.finish());
        }

        out
    }

    /// Ends the session early. Reports `Stopped` only when the session had
    /// already moved past the slop.
    pub fn cancel(&mut self) -> Option<TransformEvent> {
        match self.phase {
            Phase::Idle => None,
            Phase::Tracking { .. } => {
                log::trace!("transform canceled before touch slop");
                self.phase = Phase::Idle;
                self.tracker.reset();
                None
            }
            Phase::Transforming => Some(self.finish()),
        }
    }

    fn finish(&mut self) -> TransformEvent {
        let velocity = self
            .tracker
            .calculate_velocity_with_max(self.config.maximum_fling_velocity);
        self.tracker.reset();
        self.phase = Phase::Idle;
        log::trace!("transform stopped at {velocity:?}");
        TransformEvent::Stopped { velocity }
    }
}

/// Iterator adapter yielding the transform events of a pointer event stream.
///
/// When the stream runs out mid-session the session is treated as canceled.
pub struct TransformGestures<I> {
    events: I,
    detector: TransformGestureDetector,
    pending: smallvec::IntoIter<[TransformEvent; 2]>,
    exhausted: bool,
}

impl<I: Iterator<Item = PointerEvent>> Iterator for TransformGestures<I> {
    type Item = TransformEvent;

    fn next(&mut self) -> Option<TransformEvent> {
        loop {
            if let Some(event) = self.pending.next() {
                return Some(event);
            }
            if self.exhausted {
                return None;
            }
            match self.events.next() {
                Some(sample) => self.pending = self.detector.on_pointer_event(&sample).into_iter(),
                None => {
                    self.exhausted = true;
                    return self.detector.cancel();
                }
            }
        }
    }
}

pub trait TransformGesturesExt: Iterator<Item = PointerEvent> + Sized {
    fn transform_gestures(self, config: ViewConfiguration) -> TransformGestures<Self> {
        TransformGestures {
            events: self,
            detector: TransformGestureDetector::new(config),
            pending: TransformEvents::new().into_iter(),
            exhausted: false,
        }
    }
}

impl<I: Iterator<Item = PointerEvent>> TransformGesturesExt for I {}

#[cfg(test)]
#[path = "tests/transform_gesture_tests.rs"]
mod tests;
