//! Tap and double-tap recognition.
//!
//! A single tap is only known to be single once the double-tap timeout has
//! passed without a second press, so the detector holds it back until
//! [`TapGestureDetector::poll`] sees the timeout expire or an unrelated
//! press arrives.

use smallvec::SmallVec;

use lightbox_ui_graphics::Offset;

use crate::gesture_constants::ViewConfiguration;
use crate::input::{PointerEvent, PointerId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapEvent {
    Tap(Offset),
    DoubleTap(Offset),
}

#[derive(Debug, Clone, Copy)]
struct Press {
    pointer: PointerId,
    position: Offset,
    /// Second press of a potential double tap.
    follows_tap: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingTap {
    position: Offset,
    up_time_millis: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TapGestureDetector {
    config: ViewConfiguration,
    press: Option<Press>,
    pending: Option<PendingTap>,
}

impl TapGestureDetector {
    pub fn new(config: ViewConfiguration) -> Self {
        Self {
            config,
            press: None,
            pending: None,
        }
    }

    pub fn set_view_configuration(&mut self, config: ViewConfiguration) {
        self.config = config;
    }

    /// True while a tap is waiting for a possible second press.
    pub fn has_pending_tap(&self) -> bool {
        self.pending.is_some()
    }

    pub fn on_pointer_event(&mut self, event: &PointerEvent) -> SmallVec<[TapEvent; 2]> {
        let mut out = SmallVec::new();

        match self.press {
            None => {
                let Some(change) = event.changes.iter().find(|change| change.changed_to_down()) else {
                    return out;
                };
                let follows_tap = match self.pending {
                    Some(pending)
                        if change.uptime_millis.saturating_sub(pending.up_time_millis)
                            <= self.config.double_tap_timeout_millis
                            && (change.position - pending.position).distance()
                                <= self.config.double_tap_slop =>
                    {
                        true
                    }
                    Some(pending) => {
                        self.pending = None;
                        out.push(TapEvent::Tap(pending.position));
                        false
                    }
                    None => false,
                };
                self.press = Some(Press {
                    pointer: change.id,
                    position: change.position,
                    follows_tap,
                });
            }
            Some(press) => {
                let Some(change) = event.changes.iter().find(|change| change.id == press.pointer)
                else {
                    return out;
                };
                let moved_too_far =
                    (change.position - press.position).distance() > self.config.touch_slop;
                if event.is_consumed() || moved_too_far {
                    log::trace!("tap canceled");
                    self.press = None;
                    // The first tap of an abandoned double tap still counts.
                    if press.follows_tap {
                        if let Some(pending) = self.pending.take() {
                            out.push(TapEvent::Tap(pending.position));
                        }
                    }
                } else if !event.any_pressed() {
                    self.press = None;
                    if press.follows_tap {
                        self.pending = None;
                        out.push(TapEvent::DoubleTap(change.position));
                    } else {
                        self.pending = Some(PendingTap {
                            position: change.position,
                            up_time_millis: change.uptime_millis,
                        });
                    }
                }
            }
        }

        out
    }

    /// Delivers a held-back single tap once the double-tap timeout expired.
    pub fn poll(&mut self, now_millis: u64) -> Option<TapEvent> {
        if self.press.is_some() {
            return None;
        }
        let pending = self.pending?;
        if now_millis.saturating_sub(pending.up_time_millis) > self.config.double_tap_timeout_millis
        {
            self.pending = None;
            Some(TapEvent::Tap(pending.position))
        } else {
            None
        }
    }

    /// Forgets any press in progress and any held-back tap.
    pub fn cancel(&mut self) {
        self.press = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerInputChange;

    fn down(time: u64, position: Offset) -> PointerEvent {
        PointerEvent::new(vec![
            PointerInputChange::new(0, time, position, true).with_previous(time, position, false)
        ])
    }

    fn up(time: u64, position: Offset) -> PointerEvent {
        PointerEvent::new(vec![
            PointerInputChange::new(0, time, position, false).with_previous(time, position, true)
        ])
    }

    fn tap(detector: &mut TapGestureDetector, time: u64, position: Offset) -> Vec<TapEvent> {
        let mut out: Vec<_> = detector.on_pointer_event(&down(time, position)).into_vec();
        out.extend(detector.on_pointer_event(&up(time + 50, position)));
        out
    }

    #[test]
    fn single_tap_is_delivered_after_timeout() {
        let mut detector = TapGestureDetector::default();
        let point = Offset::new(10.0, 10.0);
        assert!(tap(&mut detector, 0, point).is_empty());
        assert!(detector.has_pending_tap());
        assert_eq!(detector.poll(300), None);
        assert_eq!(detector.poll(351), Some(TapEvent::Tap(point)));
        assert_eq!(detector.poll(1000), None);
    }

    #[test]
    fn two_close_taps_make_a_double_tap() {
        let mut detector = TapGestureDetector::default();
        assert!(tap(&mut detector, 0, Offset::new(10.0, 10.0)).is_empty());
        let second = tap(&mut detector, 200, Offset::new(40.0, 30.0));
        assert_eq!(second, vec![TapEvent::DoubleTap(Offset::new(40.0, 30.0))]);
        assert_eq!(detector.poll(10_000), None);
    }

    #[test]
    fn distant_second_press_flushes_first_tap() {
        let mut detector = TapGestureDetector::default();
        let first = Offset::new(10.0, 10.0);
        tap(&mut detector, 0, first);
        let second = tap(&mut detector, 100, Offset::new(500.0, 10.0));
        assert_eq!(second, vec![TapEvent::Tap(first)]);
        assert!(detector.has_pending_tap());
    }

    #[test]
    fn consumed_press_is_not_a_tap() {
        let mut detector = TapGestureDetector::default();
        let start = Offset::new(10.0, 10.0);
        detector.on_pointer_event(&down(0, start));
        let drag = PointerEvent::new(vec![PointerInputChange::new(
            0,
            16,
            Offset::new(12.0, 10.0),
            true,
        )
        .with_previous(0, start, true)]);
        drag.consume();
        assert!(detector.on_pointer_event(&drag).is_empty());
        assert!(detector.on_pointer_event(&up(32, start)).is_empty());
        assert!(!detector.has_pending_tap());
    }
}
