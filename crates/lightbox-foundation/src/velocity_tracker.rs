//! Velocity tracking for flings.
//!
//! Impulse strategy: the velocity is derived from the kinetic energy the
//! recent samples would impart on a unit mass, which is robust against
//! jittery touch samples.

use lightbox_ui_graphics::{Offset, Velocity};

use crate::input::PointerInputChange;

const HISTORY_SIZE: usize = 20;

/// Only samples this recent take part in the estimate.
const HORIZON_MS: u64 = 100;

/// A gap this long between samples means the pointer had stopped.
pub const ASSUME_STOPPED_MS: u64 = 40;

#[derive(Clone, Copy, Debug, Default)]
struct Sample {
    time_ms: u64,
    value: f32,
}

/// Velocity of one coordinate.
#[derive(Clone, Debug)]
pub struct VelocityTracker1D {
    samples: [Option<Sample>; HISTORY_SIZE],
    index: usize,
}

impl Default for VelocityTracker1D {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityTracker1D {
    pub fn new() -> Self {
        Self {
            samples: [None; HISTORY_SIZE],
            index: 0,
        }
    }

    /// Records the absolute position `value` at `time_ms`.
    pub fn add_data_point(&mut self, time_ms: u64, value: f32) {
        self.index = (self.index + 1) % HISTORY_SIZE;
        self.samples[self.index] = Some(Sample { time_ms, value });
    }

    /// Units per second; zero with fewer than two usable samples.
    pub fn calculate_velocity(&self) -> f32 {
        let Some(newest) = self.samples[self.index] else {
            return 0.0;
        };

        let mut values = [0.0f32; HISTORY_SIZE];
        let mut times = [0.0f32; HISTORY_SIZE];
        let mut count = 0;
        let mut cursor = self.index;
        let mut previous_time = newest.time_ms;

        while let Some(sample) = self.samples[cursor] {
            let age = newest.time_ms.saturating_sub(sample.time_ms);
            let gap = previous_time.abs_diff(sample.time_ms);
            previous_time = sample.time_ms;
            if age > HORIZON_MS || gap > ASSUME_STOPPED_MS {
                break;
            }

            values[count] = sample.value;
            times[count] = -(age as f32);
            count += 1;
            if count >= HISTORY_SIZE {
                break;
            }
            cursor = (cursor + HISTORY_SIZE - 1) % HISTORY_SIZE;
        }

        if count < 2 {
            return 0.0;
        }
        impulse_velocity(&values[..count], &times[..count]) * 1000.0
    }

    /// Like [`calculate_velocity`](Self::calculate_velocity), clamped to
    /// `±max_velocity`.
    pub fn calculate_velocity_with_max(&self, max_velocity: f32) -> f32 {
        if !max_velocity.is_finite() || max_velocity <= 0.0 {
            return 0.0;
        }
        let velocity = self.calculate_velocity();
        if velocity.is_nan() {
            return 0.0;
        }
        velocity.clamp(-max_velocity, max_velocity)
    }

    pub fn reset(&mut self) {
        self.samples = [None; HISTORY_SIZE];
        self.index = 0;
    }
}

/// Samples are newest first; times are non-positive ages in milliseconds.
fn impulse_velocity(values: &[f32], times: &[f32]) -> f32 {
    let start = values.len() - 1;
    let mut work = 0.0f32;
    let mut next_time = times[start];

    for i in (1..=start).rev() {
        let current_time = next_time;
        next_time = times[i - 1];
        if current_time == next_time {
            continue;
        }
        let v_curr = (values[i - 1] - values[i]) / (next_time - current_time);
        let v_prev = kinetic_energy_to_velocity(work);
        work += (v_curr - v_prev) * v_curr.abs();
        if i == start {
            work *= 0.5;
        }
    }

    kinetic_energy_to_velocity(work)
}

#[inline]
fn kinetic_energy_to_velocity(kinetic_energy: f32) -> f32 {
    kinetic_energy.signum() * (2.0 * kinetic_energy.abs()).sqrt()
}

/// Velocity of a pointer in two dimensions.
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    x: VelocityTracker1D,
    y: VelocityTracker1D,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_position(&mut self, time_ms: u64, position: Offset) {
        self.x.add_data_point(time_ms, position.x);
        self.y.add_data_point(time_ms, position.y);
    }

    /// Records a pointer change; a fresh press starts a new history.
    pub fn add_pointer_input_change(&mut self, change: &PointerInputChange) {
        if change.changed_to_down_ignore_consumed() {
            self.reset();
        }
        self.add_position(change.uptime_millis, change.position);
    }

    pub fn calculate_velocity(&self) -> Velocity {
        Velocity::new(self.x.calculate_velocity(), self.y.calculate_velocity())
    }

    pub fn calculate_velocity_with_max(&self, max_velocity: f32) -> Velocity {
        Velocity::new(
            self.x.calculate_velocity_with_max(max_velocity),
            self.y.calculate_velocity_with_max(max_velocity),
        )
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_single_sample_report_zero() {
        let mut tracker = VelocityTracker1D::new();
        assert_eq!(tracker.calculate_velocity(), 0.0);
        tracker.add_data_point(0, 100.0);
        assert_eq!(tracker.calculate_velocity(), 0.0);
    }

    #[test]
    fn constant_motion_is_measured() {
        let mut tracker = VelocityTracker1D::new();
        for step in 0..4u64 {
            tracker.add_data_point(step * 10, step as f32 * 100.0);
        }
        let velocity = tracker.calculate_velocity();
        assert!(
            (velocity - 10_000.0).abs() < 1000.0,
            "Expected ~10000, got {velocity}"
        );
    }

    #[test]
    fn backwards_motion_is_negative() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(0, 300.0);
        tracker.add_data_point(10, 200.0);
        tracker.add_data_point(20, 100.0);
        assert!(tracker.calculate_velocity() < 0.0);
    }

    #[test]
    fn velocity_is_capped() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(0, 0.0);
        tracker.add_data_point(1, 10_000.0);
        assert_eq!(tracker.calculate_velocity_with_max(8_000.0), 8_000.0);
        assert_eq!(tracker.calculate_velocity_with_max(f32::NAN), 0.0);
    }

    #[test]
    fn pause_before_release_means_no_fling() {
        let mut tracker = VelocityTracker1D::new();
        tracker.add_data_point(0, 0.0);
        tracker.add_data_point(ASSUME_STOPPED_MS + 1, 100.0);
        assert_eq!(tracker.calculate_velocity(), 0.0);
    }

    #[test]
    fn new_press_resets_history() {
        let mut tracker = VelocityTracker::new();
        tracker.add_position(0, Offset::new(0.0, 0.0));
        tracker.add_position(10, Offset::new(0.0, 100.0));
        assert!(tracker.calculate_velocity().y > 0.0);

        let down = PointerInputChange::new(0, 20, Offset::new(5.0, 5.0), true).with_previous(
            20,
            Offset::new(5.0, 5.0),
            false,
        );
        tracker.add_pointer_input_change(&down);
        assert_eq!(tracker.calculate_velocity(), Velocity::ZERO);
    }
}
