//! Gesture modes and the geometry the state machine derives from them.

use lightbox_ui_graphics::{Offset, Rect, Size};

/// The committed interpretation of the gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    #[default]
    None,
    /// Free zoom and pan.
    Pan,
    /// Vertical drag towards closing the viewer.
    Dismiss,
    /// Horizontal drag towards a neighbouring photo.
    Change,
}

/// Mode picked by the first drag that leaves the threshold at minimal zoom.
pub(crate) fn select_motion(pan_change: Offset, threshold: f32) -> Motion {
    let dx = pan_change.x.abs();
    let dy = pan_change.y.abs();
    if dy > threshold && dy >= dx {
        Motion::Dismiss
    } else if dx > threshold && dx > dy {
        Motion::Change
    } else {
        Motion::None
    }
}

/// `min(1, ramp * |y| / height)`. NaN when the viewport has no height.
pub(crate) fn dismiss_for_pan(pan_y: f32, viewport_height: f32, ramp: f32) -> f32 {
    if !(viewport_height > 0.0) {
        return f32::NAN;
    }
    (ramp * pan_y.abs() / viewport_height).min(1.0)
}

/// Half the extent of the photo fitted into the viewport, per axis.
///
/// Photos without a known aspect ratio are assumed to fill the viewport.
pub(crate) fn pan_limits(viewport: Size, aspect_ratio: Option<f32>) -> Offset {
    let viewport_aspect = viewport.aspect_ratio();
    let aspect = aspect_ratio
        .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
        .unwrap_or(viewport_aspect);
    let fitted = if aspect >= viewport_aspect {
        Size::new(viewport.width, viewport.width / aspect)
    } else {
        Size::new(viewport.height * aspect, viewport.height)
    };
    Offset::new(fitted.width * 0.5, fitted.height * 0.5)
}

/// Scale and pan that make a full-viewport photo cover `bounds`.
///
/// Pan is applied before scaling, so it is divided by the scale.
pub(crate) fn source_transform(bounds: Rect, viewport: Size, min_scale: f32) -> Option<(f32, Offset)> {
    if viewport.is_empty() {
        return None;
    }
    let scale = (bounds.width / viewport.width).max(bounds.height / viewport.height);
    if !scale.is_finite() {
        return None;
    }
    let scale = scale.max(min_scale);
    let pan = (bounds.center() - viewport.center()) / scale;
    Some((scale, pan))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_axis_picks_the_mode() {
        assert_eq!(select_motion(Offset::new(0.0, 20.0), 8.0), Motion::Dismiss);
        assert_eq!(select_motion(Offset::new(-20.0, 3.0), 8.0), Motion::Change);
        assert_eq!(select_motion(Offset::new(20.0, -15.0), 8.0), Motion::Change);
        assert_eq!(select_motion(Offset::new(4.0, 4.0), 8.0), Motion::None);
    }

    #[test]
    fn dismiss_progress_ramps_to_one_at_a_quarter_height() {
        let height = 2000.0;
        let mut previous = 0.0;
        for step in 0..=10 {
            let progress = dismiss_for_pan(step as f32 * 50.0, height, 4.0);
            assert!(progress >= previous, "progress must not decrease");
            previous = progress;
        }
        assert_eq!(dismiss_for_pan(500.0, height, 4.0), 1.0);
        assert_eq!(dismiss_for_pan(-500.0, height, 4.0), 1.0);
        assert_eq!(dismiss_for_pan(5000.0, height, 4.0), 1.0);
        assert!(dismiss_for_pan(10.0, 0.0, 4.0).is_nan());
    }

    #[test]
    fn limits_follow_the_fitted_photo() {
        let viewport = Size::new(1000.0, 2000.0);
        assert_eq!(pan_limits(viewport, Some(2.0)), Offset::new(500.0, 250.0));
        assert_eq!(pan_limits(viewport, Some(0.25)), Offset::new(250.0, 1000.0));
        assert_eq!(pan_limits(viewport, None), Offset::new(500.0, 1000.0));
    }

    #[test]
    fn source_transform_covers_the_thumbnail() {
        let viewport = Size::new(1000.0, 2000.0);
        let bounds = Rect::new(100.0, 100.0, 200.0, 200.0);
        let (scale, pan) = source_transform(bounds, viewport, 0.01).expect("non-empty viewport");
        assert!((scale - 0.2).abs() < 1e-6);
        let covered = pan * scale + viewport.center();
        assert!((covered - bounds.center()).distance() < 1e-3, "{covered:?}");
        assert_eq!(source_transform(bounds, Size::ZERO, 0.01), None);
    }
}
