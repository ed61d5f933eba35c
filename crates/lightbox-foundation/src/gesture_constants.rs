//! Gesture thresholds shared by the transform and tap detectors.
//!
//! The constants are in density-independent pixels (or milliseconds);
//! [`ViewConfiguration::for_density`] converts them to pixels for one
//! screen.

use lightbox_ui_graphics::Dp;

/// Distance a pointer may travel before a press stops being a tap and
/// becomes a transform.
///
/// Matches the platform convention of 8dp.
pub const TOUCH_SLOP: Dp = Dp(8.0);

/// Longest wait between the first release and the second press of a
/// double tap.
pub const DOUBLE_TAP_TIMEOUT_MS: u64 = 300;

/// Farthest the second press of a double tap may land from the first.
pub const DOUBLE_TAP_SLOP: Dp = Dp(100.0);

/// Fling velocities are capped to this, in dp per second.
pub const MAX_FLING_VELOCITY: Dp = Dp(8_000.0);

/// Gesture thresholds resolved to pixels for one screen density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfiguration {
    pub touch_slop: f32,
    pub double_tap_timeout_millis: u64,
    pub double_tap_slop: f32,
    pub maximum_fling_velocity: f32,
}

impl ViewConfiguration {
    pub fn for_density(density: f32) -> Self {
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        Self {
            touch_slop: TOUCH_SLOP.to_px(density),
            double_tap_timeout_millis: DOUBLE_TAP_TIMEOUT_MS,
            double_tap_slop: DOUBLE_TAP_SLOP.to_px(density),
            maximum_fling_velocity: MAX_FLING_VELOCITY.to_px(density),
        }
    }

    pub fn with_touch_slop(mut self, touch_slop: f32) -> Self {
        self.touch_slop = touch_slop;
        self
    }

    pub fn with_double_tap_timeout_millis(mut self, timeout: u64) -> Self {
        self.double_tap_timeout_millis = timeout;
        self
    }

    pub fn with_double_tap_slop(mut self, slop: f32) -> Self {
        self.double_tap_slop = slop;
        self
    }

    pub fn with_maximum_fling_velocity(mut self, velocity: f32) -> Self {
        self.maximum_fling_velocity = velocity;
        self
    }
}

impl Default for ViewConfiguration {
    fn default() -> Self {
        Self::for_density(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_scale_with_density() {
        let config = ViewConfiguration::for_density(2.5);
        assert_eq!(config.touch_slop, 20.0);
        assert_eq!(config.double_tap_slop, 250.0);
        assert_eq!(config.maximum_fling_velocity, 20_000.0);
        assert_eq!(config.double_tap_timeout_millis, 300);
    }

    #[test]
    fn invalid_density_falls_back_to_baseline() {
        assert_eq!(ViewConfiguration::for_density(0.0), ViewConfiguration::default());
        assert_eq!(
            ViewConfiguration::for_density(f32::NAN).touch_slop,
            TOUCH_SLOP.0
        );
    }
}
