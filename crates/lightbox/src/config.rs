//! Tuning constants for the viewer.

use lightbox_ui_graphics::Dp;
use serde::{Deserialize, Serialize};

/// Thresholds and durations used by [`LightboxState`](crate::LightboxState).
///
/// Every field has a default, so a partial document deserializes:
///
/// ```
/// let config: lightbox::LightboxConfig =
///     serde_json::from_str(r#"{ "double_tap_zoom": 2.5 }"#).unwrap();
/// assert_eq!(config.double_tap_zoom, 2.5);
/// assert_eq!(config.entry_duration_millis, 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightboxConfig {
    /// Drag distance before a gesture at minimal zoom picks dismiss or change.
    pub motion_threshold: Dp,
    /// Dismiss progress reaches 1 after `viewport_height / dismiss_ramp`.
    pub dismiss_ramp: f32,
    /// Fraction of the viewport width a change drag must be projected past.
    pub navigate_fraction: f32,
    pub double_tap_zoom: f32,
    /// Above this scale a double tap zooms back out.
    pub zoom_out_threshold: f32,
    /// Scale factor the photo shrinks by while closing.
    pub close_scale: f32,
    pub min_scale: f32,
    pub entry_duration_millis: u64,
    pub double_tap_duration_millis: u64,
    pub dismiss_duration_millis: u64,
    /// Dismissed photos fly to this many viewport heights away.
    pub dismiss_offscreen_factor: f32,
    /// How much the photo shrinks at full dismiss progress.
    pub dismiss_shrink: f32,
    /// How much the scrim fades at full dismiss progress.
    pub dismiss_scrim_fade: f32,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            motion_threshold: Dp(8.0),
            dismiss_ramp: 4.0,
            navigate_fraction: 0.5,
            double_tap_zoom: 4.0,
            zoom_out_threshold: 1.1,
            close_scale: 0.85,
            min_scale: 0.05,
            entry_duration_millis: 500,
            double_tap_duration_millis: 250,
            dismiss_duration_millis: 250,
            dismiss_offscreen_factor: 1.5,
            dismiss_shrink: 0.2,
            dismiss_scrim_fade: 0.6,
        }
    }
}

impl LightboxConfig {
    pub fn with_motion_threshold(mut self, threshold: Dp) -> Self {
        self.motion_threshold = threshold;
        self
    }

    pub fn with_dismiss_ramp(mut self, ramp: f32) -> Self {
        self.dismiss_ramp = ramp;
        self
    }

    pub fn with_navigate_fraction(mut self, fraction: f32) -> Self {
        self.navigate_fraction = fraction;
        self
    }

    pub fn with_double_tap_zoom(mut self, zoom: f32) -> Self {
        self.double_tap_zoom = zoom;
        self
    }

    pub fn with_zoom_out_threshold(mut self, threshold: f32) -> Self {
        self.zoom_out_threshold = threshold;
        self
    }

    pub fn with_close_scale(mut self, scale: f32) -> Self {
        self.close_scale = scale;
        self
    }

    /// Non-positive values are raised to a tiny positive scale.
    pub fn with_min_scale(mut self, scale: f32) -> Self {
        self.min_scale = scale;
        self
    }

    pub fn with_entry_duration_millis(mut self, millis: u64) -> Self {
        self.entry_duration_millis = millis;
        self
    }

    pub fn with_double_tap_duration_millis(mut self, millis: u64) -> Self {
        self.double_tap_duration_millis = millis;
        self
    }

    pub fn with_dismiss_duration_millis(mut self, millis: u64) -> Self {
        self.dismiss_duration_millis = millis;
        self
    }

    /// Smallest scale a pinch can reach; always positive.
    pub(crate) fn scale_floor(&self) -> f32 {
        if self.min_scale > 0.0 {
            self.min_scale
        } else {
            f32::EPSILON
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_constants() {
        let config = LightboxConfig::default();
        assert_eq!(config.motion_threshold, Dp(8.0));
        assert_eq!(config.dismiss_ramp, 4.0);
        assert_eq!(config.double_tap_zoom, 4.0);
        assert_eq!(config.close_scale, 0.85);
        assert_eq!(config.entry_duration_millis, 500);
    }

    #[test]
    fn scale_floor_is_positive() {
        assert_eq!(LightboxConfig::default().scale_floor(), 0.05);
        assert!(LightboxConfig::default().with_min_scale(-1.0).scale_floor() > 0.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LightboxConfig =
            serde_json::from_str(r#"{ "motion_threshold": 12.0, "close_scale": 0.5 }"#)
                .expect("valid config");
        assert_eq!(config.motion_threshold, Dp(12.0));
        assert_eq!(config.close_scale, 0.5);
        assert_eq!(config.navigate_fraction, 0.5);
    }
}
