//! Pointer input model.
//!
//! A [`PointerEvent`] carries one [`PointerInputChange`] per pointer that is
//! down or was down in the previous event. Consumption is shared between
//! clones of a change, so a detector that claims a movement is visible to
//! every other detector looking at the same event.

use std::cell::Cell;
use std::rc::Rc;

use lightbox_ui_graphics::Offset;

pub type PointerId = u64;

/// Describes how one pointer changed since the previous event.
#[derive(Clone, Debug)]
pub struct PointerInputChange {
    pub id: PointerId,
    pub uptime_millis: u64,
    pub position: Offset,
    pub pressed: bool,
    pub previous_uptime_millis: u64,
    pub previous_position: Offset,
    pub previous_pressed: bool,
    consumed: Rc<Cell<bool>>,
}

impl PointerInputChange {
    /// A change whose previous state equals its current state.
    pub fn new(id: PointerId, uptime_millis: u64, position: Offset, pressed: bool) -> Self {
        Self {
            id,
            uptime_millis,
            position,
            pressed,
            previous_uptime_millis: uptime_millis,
            previous_position: position,
            previous_pressed: pressed,
            consumed: Rc::new(Cell::new(false)),
        }
    }

    pub fn with_previous(mut self, uptime_millis: u64, position: Offset, pressed: bool) -> Self {
        self.previous_uptime_millis = uptime_millis;
        self.previous_position = position;
        self.previous_pressed = pressed;
        self
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.get()
    }

    pub fn consume(&self) {
        self.consumed.set(true);
    }

    pub fn changed_to_down(&self) -> bool {
        !self.is_consumed() && self.changed_to_down_ignore_consumed()
    }

    pub fn changed_to_down_ignore_consumed(&self) -> bool {
        !self.previous_pressed && self.pressed
    }

    pub fn changed_to_up(&self) -> bool {
        !self.is_consumed() && self.changed_to_up_ignore_consumed()
    }

    pub fn changed_to_up_ignore_consumed(&self) -> bool {
        self.previous_pressed && !self.pressed
    }

    /// Movement since the previous event, or zero once consumed.
    pub fn position_change(&self) -> Offset {
        if self.is_consumed() {
            Offset::ZERO
        } else {
            self.position_change_ignore_consumed()
        }
    }

    pub fn position_change_ignore_consumed(&self) -> Offset {
        self.position - self.previous_position
    }

    pub fn position_changed(&self) -> bool {
        self.position_change() != Offset::ZERO
    }
}

/// All pointer changes delivered together.
#[derive(Clone, Debug, Default)]
pub struct PointerEvent {
    pub changes: Vec<PointerInputChange>,
}

impl PointerEvent {
    pub fn new(changes: Vec<PointerInputChange>) -> Self {
        Self { changes }
    }

    /// Latest uptime among the changes.
    pub fn uptime_millis(&self) -> u64 {
        self.changes
            .iter()
            .map(|change| change.uptime_millis)
            .max()
            .unwrap_or(0)
    }

    /// The first pointer that is or was down.
    pub fn main_pointer(&self) -> Option<&PointerInputChange> {
        self.changes
            .iter()
            .find(|change| change.pressed || change.previous_pressed)
    }

    pub fn any_pressed(&self) -> bool {
        self.changes.iter().any(|change| change.pressed)
    }

    pub fn is_consumed(&self) -> bool {
        self.changes.iter().any(PointerInputChange::is_consumed)
    }

    pub fn consume(&self) {
        for change in &self.changes {
            change.consume();
        }
    }

    /// Average position of the pointers that stayed down, using either the
    /// current or the previous positions.
    pub fn calculate_centroid(&self, use_current: bool) -> Option<Offset> {
        let mut sum = Offset::ZERO;
        let mut count = 0usize;
        for change in self.held_pointers() {
            sum += if use_current {
                change.position
            } else {
                change.previous_position
            };
            count += 1;
        }
        (count > 0).then(|| sum / count as f32)
    }

    /// Average distance of the held pointers from their centroid.
    pub fn calculate_centroid_size(&self, use_current: bool) -> f32 {
        let Some(centroid) = self.calculate_centroid(use_current) else {
            return 0.0;
        };
        let mut distance = 0.0f32;
        let mut count = 0usize;
        for change in self.held_pointers() {
            let position = if use_current {
                change.position
            } else {
                change.previous_position
            };
            distance += (position - centroid).distance();
            count += 1;
        }
        distance / count as f32
    }

    /// Centroid movement since the previous event.
    pub fn calculate_pan(&self) -> Offset {
        match (self.calculate_centroid(true), self.calculate_centroid(false)) {
            (Some(current), Some(previous)) => current - previous,
            _ => Offset::ZERO,
        }
    }

    /// Ratio of the current to the previous pointer spread; 1 with fewer
    /// than two held pointers.
    pub fn calculate_zoom(&self) -> f32 {
        let current = self.calculate_centroid_size(true);
        let previous = self.calculate_centroid_size(false);
        if current == 0.0 || previous == 0.0 {
            1.0
        } else {
            current / previous
        }
    }

    /// Pointers down in both this and the previous event. Pointers landing
    /// or lifting would otherwise make the centroid jump.
    fn held_pointers(&self) -> impl Iterator<Item = &PointerInputChange> {
        self.changes
            .iter()
            .filter(|change| change.pressed && change.previous_pressed)
    }
}
