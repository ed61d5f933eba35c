//! Animation system for the lightbox viewer
//!
//! This crate provides animated values ([`Animatable`]) together with tween,
//! spring and decay (fling) specifications and easing functions.

pub mod animatable;
pub mod animation;
pub mod decay_spec;

pub use animatable::{Animatable, AnimationEndReason, AnimationResult, AnimationState};
pub use animation::*;
pub use decay_spec::{
    calculate_target_value, ExponentialDecaySpec, FlingCalculator, FlingInfo,
    FloatDecayAnimationSpec, SplineBasedDecaySpec,
};

pub mod prelude {
    pub use crate::animatable::{Animatable, AnimationEndReason, AnimationResult};
    pub use crate::animation::{AnimationSpec, AnimationType, AnimationVector, Easing, SpringSpec};
    pub use crate::decay_spec::{calculate_target_value, FloatDecayAnimationSpec, SplineBasedDecaySpec};
}
