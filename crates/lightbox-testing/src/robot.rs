//! Scripted pointer input.
//!
//! ```
//! use lightbox_testing::PointerRobot;
//! use lightbox_ui_graphics::Offset;
//!
//! let mut robot = PointerRobot::new();
//! let down = robot.down(0, Offset::new(10.0, 10.0));
//! let drag = robot.move_by(0, Offset::new(30.0, 0.0));
//! let up = robot.up(0);
//! assert!(down.changes[0].changed_to_down());
//! assert_eq!(drag.calculate_pan(), Offset::new(30.0, 0.0));
//! assert!(!up.any_pressed());
//! ```

use lightbox_foundation::{PointerEvent, PointerId, PointerInputChange};
use lightbox_ui_graphics::Offset;

#[derive(Debug, Clone, Copy)]
struct Contact {
    id: PointerId,
    position: Offset,
    time_millis: u64,
}

/// Produces pointer events for a set of simulated fingers.
///
/// Every event lists all fingers that are down; moves advance the clock by
/// [`step_millis`](Self::with_step_millis).
#[derive(Debug, Clone)]
pub struct PointerRobot {
    now_millis: u64,
    step_millis: u64,
    contacts: Vec<Contact>,
}

impl Default for PointerRobot {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerRobot {
    pub fn new() -> Self {
        Self {
            now_millis: 0,
            step_millis: 10,
            contacts: Vec::new(),
        }
    }

    pub fn with_step_millis(mut self, step_millis: u64) -> Self {
        self.step_millis = step_millis;
        self
    }

    pub fn starting_at(mut self, now_millis: u64) -> Self {
        self.now_millis = now_millis;
        self
    }

    pub fn now_millis(&self) -> u64 {
        self.now_millis
    }

    pub fn advance(&mut self, millis: u64) {
        self.now_millis += millis;
    }

    pub fn position(&self, id: PointerId) -> Option<Offset> {
        self.contacts
            .iter()
            .find(|contact| contact.id == id)
            .map(|contact| contact.position)
    }

    pub fn down(&mut self, id: PointerId, position: Offset) -> PointerEvent {
        let now = self.now_millis;
        let mut changes = self.held_changes(&[]);
        changes.push(
            PointerInputChange::new(id, now, position, true).with_previous(now, position, false),
        );
        self.contacts.push(Contact {
            id,
            position,
            time_millis: now,
        });
        PointerEvent::new(changes)
    }

    pub fn move_to(&mut self, id: PointerId, position: Offset) -> PointerEvent {
        self.move_many(&[(id, position)])
    }

    pub fn move_by(&mut self, id: PointerId, delta: Offset) -> PointerEvent {
        let target = self.position(id).unwrap_or(Offset::ZERO) + delta;
        self.move_to(id, target)
    }

    /// Moves several fingers in one event.
    pub fn move_many(&mut self, targets: &[(PointerId, Offset)]) -> PointerEvent {
        self.now_millis += self.step_millis;
        let now = self.now_millis;
        let changes = self
            .contacts
            .iter_mut()
            .map(|contact| {
                let previous = *contact;
                if let Some((_, target)) = targets.iter().find(|(id, _)| *id == contact.id) {
                    contact.position = *target;
                }
                contact.time_millis = now;
                PointerInputChange::new(contact.id, now, contact.position, true).with_previous(
                    previous.time_millis,
                    previous.position,
                    true,
                )
            })
            .collect();
        PointerEvent::new(changes)
    }

    pub fn up(&mut self, id: PointerId) -> PointerEvent {
        let now = self.now_millis;
        let mut changes = self.held_changes(&[id]);
        if let Some(index) = self.contacts.iter().position(|contact| contact.id == id) {
            let contact = self.contacts.remove(index);
            changes.push(
                PointerInputChange::new(id, now, contact.position, false).with_previous(
                    contact.time_millis,
                    contact.position,
                    true,
                ),
            );
        }
        PointerEvent::new(changes)
    }

    /// Press and release at `position` after `hold_millis`.
    pub fn tap(&mut self, position: Offset, hold_millis: u64) -> Vec<PointerEvent> {
        let id = self.free_id();
        let down = self.down(id, position);
        self.advance(hold_millis);
        vec![down, self.up(id)]
    }

    /// One finger pressed at `from`, moved by `delta` in `steps` equal moves
    /// and released.
    pub fn swipe(&mut self, from: Offset, delta: Offset, steps: usize) -> Vec<PointerEvent> {
        let id = self.free_id();
        let steps = steps.max(1);
        let step = delta / steps as f32;
        let mut events = vec![self.down(id, from)];
        for _ in 0..steps {
            events.push(self.move_by(id, step));
        }
        events.push(self.up(id));
        events
    }

    fn held_changes(&self, except: &[PointerId]) -> Vec<PointerInputChange> {
        let now = self.now_millis;
        self.contacts
            .iter()
            .filter(|contact| !except.contains(&contact.id))
            .map(|contact| {
                PointerInputChange::new(contact.id, now, contact.position, true).with_previous(
                    contact.time_millis,
                    contact.position,
                    true,
                )
            })
            .collect()
    }

    fn free_id(&self) -> PointerId {
        (0..)
            .find(|id| self.contacts.iter().all(|contact| contact.id != *id))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_finger_keeps_first_held() {
        let mut robot = PointerRobot::new();
        robot.down(0, Offset::new(0.0, 0.0));
        let event = robot.down(1, Offset::new(100.0, 0.0));
        assert_eq!(event.changes.len(), 2);
        assert!(!event.changes[0].changed_to_down());
        assert!(event.changes[1].changed_to_down());

        let spread = robot.move_many(&[(0, Offset::new(-50.0, 0.0)), (1, Offset::new(150.0, 0.0))]);
        assert_eq!(spread.calculate_zoom(), 2.0);
        assert_eq!(spread.uptime_millis(), 10);
    }

    #[test]
    fn swipe_ends_with_release() {
        let mut robot = PointerRobot::new();
        let events = robot.swipe(Offset::ZERO, Offset::new(0.0, 90.0), 3);
        assert_eq!(events.len(), 5);
        assert_eq!(events[2].calculate_pan(), Offset::new(0.0, 30.0));
        assert!(events[4].changes[0].changed_to_up());
        assert_eq!(robot.now_millis(), 30);
    }
}
