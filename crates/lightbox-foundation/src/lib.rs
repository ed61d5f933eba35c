//! Pointer input and gesture recognition for the lightbox viewer.

pub mod gesture_constants;
pub mod input;
pub mod tap_gesture;
pub mod transform_gesture;
pub mod velocity_tracker;

pub use gesture_constants::ViewConfiguration;
pub use input::{PointerEvent, PointerId, PointerInputChange};
pub use tap_gesture::{TapEvent, TapGestureDetector};
pub use transform_gesture::{
    TransformEvent, TransformEvents, TransformGestureDetector, TransformGestures,
    TransformGesturesExt,
};
pub use velocity_tracker::{VelocityTracker, VelocityTracker1D};

pub mod prelude {
    pub use crate::input::{PointerEvent, PointerInputChange};
    pub use crate::tap_gesture::{TapEvent, TapGestureDetector};
    pub use crate::transform_gesture::{TransformEvent, TransformGestureDetector};
    pub use crate::ViewConfiguration;
}
