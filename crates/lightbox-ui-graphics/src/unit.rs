//! Unit types: Dp, layout direction

use serde::{Deserialize, Serialize};

/// Density-independent pixels
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dp(pub f32);

impl Dp {
    pub fn to_px(&self, density: f32) -> f32 {
        self.0 * density
    }

    pub fn from_px(px: f32, density: f32) -> Self {
        Self(px / density)
    }
}

/// Horizontal reading direction of the host UI.
///
/// Horizontal gestures are mirrored for right-to-left layouts so that
/// "swipe towards the next photo" follows the reading order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    #[default]
    Ltr,
    Rtl,
}

impl LayoutDirection {
    pub fn is_rtl(self) -> bool {
        matches!(self, LayoutDirection::Rtl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dp_round_trips_through_px() {
        let dp = Dp(8.0);
        assert_eq!(dp.to_px(2.5), 20.0);
        assert_eq!(Dp::from_px(20.0, 2.5), dp);
    }
}
