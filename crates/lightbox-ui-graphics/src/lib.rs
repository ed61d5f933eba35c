//! Pure math/data for the lightbox viewer
//!
//! Geometry primitives and unit types shared by the gesture recognizers,
//! the animation system and the viewer state machine.

mod geometry;
mod unit;

pub use geometry::*;
pub use unit::*;

pub mod prelude {
    pub use crate::geometry::{Offset, Rect, Size, Velocity};
    pub use crate::unit::{Dp, LayoutDirection};
}
