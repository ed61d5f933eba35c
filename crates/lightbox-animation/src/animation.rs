//! Animation specifications: easing curves, tweens and springs.
//!
//! Values are animated component-wise through the [`AnimationVector`]
//! trait, so the same specs drive scalars (`f32`) and 2D offsets.

use std::fmt;

use lightbox_ui_graphics::Offset;

/// Trait for types that can be linearly interpolated.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

impl Lerp for Offset {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Offset::new(
            self.x.lerp(&target.x, fraction),
            self.y.lerp(&target.y, fraction),
        )
    }
}

/// A value made of independently animated `f32` components.
pub trait AnimationVector: Lerp + Copy + PartialEq + fmt::Debug + 'static {
    /// Number of components.
    const SIZE: usize;

    fn zero() -> Self;

    fn component(&self, index: usize) -> f32;

    fn set_component(&mut self, index: usize, value: f32);

    /// Builds a new value by transforming every component.
    fn map_components(self, mut f: impl FnMut(usize, f32) -> f32) -> Self {
        let mut result = self;
        for index in 0..Self::SIZE {
            result.set_component(index, f(index, self.component(index)));
        }
        result
    }

    fn is_finite(&self) -> bool {
        (0..Self::SIZE).all(|index| self.component(index).is_finite())
    }
}

impl AnimationVector for f32 {
    const SIZE: usize = 1;

    fn zero() -> Self {
        0.0
    }

    fn component(&self, _index: usize) -> f32 {
        *self
    }

    fn set_component(&mut self, _index: usize, value: f32) {
        *self = value;
    }
}

impl AnimationVector for Offset {
    const SIZE: usize = 2;

    fn zero() -> Self {
        Offset::ZERO
    }

    fn component(&self, index: usize) -> f32 {
        match index {
            0 => self.x,
            _ => self.y,
        }
    }

    fn set_component(&mut self, index: usize, value: f32) {
        match index {
            0 => self.x = value,
            _ => self.y = value,
        }
    }
}

/// Easing functions matching the Material motion curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// Linear interpolation (no easing).
    LinearEasing,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Fast out, slow in (material design standard).
    FastOutSlowInEasing,
    LinearOutSlowInEasing,
    FastOutLinearEasing,
}

impl Easing {
    /// Apply the easing function to a linear fraction [0, 1].
    pub fn transform(&self, fraction: f32) -> f32 {
        match self {
            Easing::LinearEasing => fraction,
            Easing::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, fraction),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, fraction),
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, fraction),
            Easing::FastOutSlowInEasing => cubic_bezier(0.4, 0.0, 0.2, 1.0, fraction),
            Easing::LinearOutSlowInEasing => cubic_bezier(0.0, 0.0, 0.2, 1.0, fraction),
            Easing::FastOutLinearEasing => cubic_bezier(0.4, 0.0, 1.0, 1.0, fraction),
        }
    }
}

/// Evaluates a unit cubic bezier easing curve at `fraction`.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, fraction: f32) -> f32 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }

    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;

    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let sample = |a: f32, b: f32, c: f32, t: f32| ((a * t + b) * t + c) * t;
    let slope = |a: f32, b: f32, c: f32, t: f32| (3.0 * a * t + 2.0 * b) * t + c;

    // Newton-Raphson on the x curve, falling back to bisection.
    let mut t = fraction;
    let mut solved = false;
    for _ in 0..8 {
        let x = sample(ax, bx, cx, t) - fraction;
        if x.abs() < 1e-6 {
            solved = true;
            break;
        }
        let dx = slope(ax, bx, cx, t);
        if dx.abs() < 1e-6 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    if !solved {
        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        t = fraction;
        for _ in 0..16 {
            let delta = sample(ax, bx, cx, t) - fraction;
            if delta.abs() < 1e-6 {
                break;
            }
            if delta > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            t = 0.5 * (lo + hi);
        }
    }

    sample(ay, by, cy, t)
}

/// Tween specification: duration, easing and optional start delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    pub duration_millis: u64,
    pub easing: Easing,
    pub delay_millis: u64,
}

impl AnimationSpec {
    pub fn tween(duration_millis: u64, easing: Easing) -> Self {
        Self {
            duration_millis,
            easing,
            delay_millis: 0,
        }
    }

    pub fn linear(duration_millis: u64) -> Self {
        Self::tween(duration_millis, Easing::LinearEasing)
    }

    pub fn with_delay(mut self, delay_millis: u64) -> Self {
        self.delay_millis = delay_millis;
        self
    }

    /// Linear progress in [0, 1] after `play_time_nanos`, or `None` while
    /// the start delay is still running.
    pub(crate) fn linear_progress(&self, play_time_nanos: u64) -> Option<f32> {
        let delay_nanos = self.delay_millis * 1_000_000;
        if play_time_nanos < delay_nanos {
            return None;
        }
        let elapsed = play_time_nanos - delay_nanos;
        let duration_nanos = (self.duration_millis * 1_000_000).max(1);
        Some((elapsed as f64 / duration_nanos as f64).clamp(0.0, 1.0) as f32)
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::tween(300, Easing::FastOutSlowInEasing)
    }
}

/// Integration step used when advancing springs, in seconds.
const SPRING_TIMESTEP: f32 = 0.004;

/// Damped spring configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    /// 1.0 = critically damped, < 1.0 = bouncy, > 1.0 = over-damped.
    pub damping_ratio: f32,
    /// Higher values settle faster.
    pub stiffness: f32,
    /// Velocity (units/s) below which the spring may settle.
    pub velocity_threshold: f32,
    /// Distance from the target below which the spring may settle.
    pub position_threshold: f32,
}

impl SpringSpec {
    /// Critically damped, medium stiffness.
    pub fn default_spring() -> Self {
        Self {
            damping_ratio: 1.0,
            stiffness: 1500.0,
            velocity_threshold: 0.01,
            position_threshold: 0.001,
        }
    }

    pub fn bouncy() -> Self {
        Self {
            damping_ratio: 0.5,
            ..Self::default_spring()
        }
    }

    pub fn stiff() -> Self {
        Self {
            stiffness: 3000.0,
            ..Self::default_spring()
        }
    }

    /// Advances one component from `(value, velocity)` towards `target` by
    /// `dt` seconds using semi-implicit Euler steps.
    pub(crate) fn advance(&self, value: f32, velocity: f32, target: f32, dt: f32) -> (f32, f32) {
        let stiffness = self.stiffness;
        let damping = 2.0 * self.damping_ratio * stiffness.sqrt();
        let (mut x, mut v) = (value, velocity);
        let mut elapsed = 0.0f32;
        while elapsed < dt {
            let step = SPRING_TIMESTEP.min(dt - elapsed);
            let force = -stiffness * (x - target) - damping * v;
            v += force * step;
            x += v * step;
            elapsed += step;
        }
        (x, v)
    }

    pub(crate) fn is_settled(
        &self,
        value: f32,
        velocity: f32,
        target: f32,
        visibility_threshold: f32,
    ) -> bool {
        let position_threshold = self.position_threshold.max(visibility_threshold);
        let velocity_threshold = self.velocity_threshold.max(visibility_threshold);
        (value - target).abs() < position_threshold && velocity.abs() < velocity_threshold
    }
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::default_spring()
    }
}

/// Animation type specification for target-based animations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationType {
    /// Time-based tween animation.
    Tween(AnimationSpec),
    /// Physics-based spring animation.
    Spring(SpringSpec),
}

impl AnimationType {
    pub fn tween(duration_millis: u64) -> Self {
        AnimationType::Tween(AnimationSpec::tween(
            duration_millis,
            Easing::FastOutSlowInEasing,
        ))
    }

    pub fn spring() -> Self {
        AnimationType::Spring(SpringSpec::default())
    }
}

impl Default for AnimationType {
    fn default() -> Self {
        AnimationType::Tween(AnimationSpec::default())
    }
}

impl From<AnimationSpec> for AnimationType {
    fn from(spec: AnimationSpec) -> Self {
        AnimationType::Tween(spec)
    }
}

impl From<SpringSpec> for AnimationType {
    fn from(spec: SpringSpec) -> Self {
        AnimationType::Spring(spec)
    }
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
