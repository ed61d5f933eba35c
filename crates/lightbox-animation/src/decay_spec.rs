//! Decay (fling) animation specifications.
//!
//! A decay has no target of its own: it starts from a velocity and slows
//! down until it stops. [`SplineBasedDecaySpec`] follows the scroller
//! deceleration curve used for list flings; [`ExponentialDecaySpec`] is a
//! simple friction model whose resting point is cheap to compute.

use std::sync::LazyLock;

use crate::animation::AnimationVector;

const INFLECTION: f32 = 0.35;
const START_TENSION: f32 = 0.5;
const END_TENSION: f32 = 1.0;
const P1: f32 = START_TENSION * INFLECTION;
const P2: f32 = 1.0 - END_TENSION * (1.0 - INFLECTION);

const NB_SAMPLES: usize = 100;

/// Distance travelled (as a fraction of the full fling) at evenly spaced
/// points in time.
static SPLINE_POSITIONS: LazyLock<[f32; NB_SAMPLES + 1]> = LazyLock::new(|| {
    let mut positions = [0.0f32; NB_SAMPLES + 1];
    let mut x_min = 0.0f32;

    for (i, position) in positions.iter_mut().enumerate().take(NB_SAMPLES) {
        let alpha = i as f32 / NB_SAMPLES as f32;
        let mut x_max = 1.0f32;
        // Bisect for the x where the time curve reaches alpha.
        let (x, coef) = loop {
            let x_mid = x_min + (x_max - x_min) / 2.0;
            let c = 3.0 * x_mid * (1.0 - x_mid);
            let tx = c * ((1.0 - x_mid) * P1 + x_mid * P2) + x_mid * x_mid * x_mid;
            if (tx - alpha).abs() < 1e-5 {
                break (x_mid, c);
            }
            if tx > alpha {
                x_max = x_mid;
            } else {
                x_min = x_mid;
            }
        };
        *position = coef * ((1.0 - x) * START_TENSION + x) + x * x * x;
    }

    positions[NB_SAMPLES] = 1.0;
    positions
});

/// Sample of the fling spline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineSample {
    /// Fraction of the total distance covered, 0.0 to 1.0.
    pub distance_fraction: f32,
    /// Slope of the distance curve at the sample point.
    pub velocity_fraction: f32,
}

/// The scroller fling curve, normalized to unit time and distance.
pub struct FlingSpline;

impl FlingSpline {
    /// Samples the spline at `time` in [0, 1].
    pub fn sample(time: f32) -> SplineSample {
        let time = if time.is_nan() { 1.0 } else { time.clamp(0.0, 1.0) };
        let index = (NB_SAMPLES as f32 * time) as usize;
        if index >= NB_SAMPLES {
            return SplineSample {
                distance_fraction: 1.0,
                velocity_fraction: 0.0,
            };
        }

        let t_inf = index as f32 / NB_SAMPLES as f32;
        let t_sup = (index + 1) as f32 / NB_SAMPLES as f32;
        let d_inf = SPLINE_POSITIONS[index];
        let d_sup = SPLINE_POSITIONS[index + 1];
        let slope = (d_sup - d_inf) / (t_sup - t_inf);
        SplineSample {
            distance_fraction: d_inf + (time - t_inf) * slope,
            velocity_fraction: slope,
        }
    }

    fn deceleration(velocity: f32, friction: f32) -> f64 {
        (INFLECTION as f64 * velocity.abs() as f64 / friction as f64).ln()
    }
}

const GRAVITY_EARTH: f32 = 9.80665;
const INCHES_PER_METER: f32 = 39.37;
/// `ln(0.78) / ln(0.9)`
const DECELERATION_RATE: f64 = 2.358_201_6;

fn physical_coefficient(density: f32) -> f32 {
    GRAVITY_EARTH * INCHES_PER_METER * density * 160.0 * 0.84
}

/// Precomputed description of one fling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingInfo {
    /// px/s, signed.
    pub initial_velocity: f32,
    /// Unsigned distance the fling covers.
    pub distance: f32,
    pub duration_millis: u64,
}

impl FlingInfo {
    fn fraction(&self, time_millis: u64) -> f32 {
        if self.duration_millis == 0 {
            1.0
        } else {
            time_millis as f32 / self.duration_millis as f32
        }
    }

    /// Signed displacement from the start position at `time_millis`.
    pub fn position(&self, time_millis: u64) -> f32 {
        self.distance
            * self.initial_velocity.signum()
            * FlingSpline::sample(self.fraction(time_millis)).distance_fraction
    }

    /// Velocity in px/s at `time_millis`.
    pub fn velocity(&self, time_millis: u64) -> f32 {
        if self.duration_millis == 0 {
            return 0.0;
        }
        FlingSpline::sample(self.fraction(time_millis)).velocity_fraction
            * self.initial_velocity.signum()
            * self.distance
            / self.duration_millis as f32
            * 1000.0
    }

    pub fn is_finished(&self, time_millis: u64) -> bool {
        time_millis >= self.duration_millis
    }
}

/// Computes fling duration and distance from a release velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingCalculator {
    friction: f32,
    physical_coefficient: f32,
}

impl FlingCalculator {
    pub const DEFAULT_FRICTION: f32 = 0.015;

    pub fn new(friction: f32, density: f32) -> Self {
        Self {
            friction,
            physical_coefficient: physical_coefficient(density),
        }
    }

    pub fn with_density(density: f32) -> Self {
        Self::new(Self::DEFAULT_FRICTION, density)
    }

    fn spline_deceleration(&self, velocity: f32) -> f64 {
        FlingSpline::deceleration(velocity, self.friction * self.physical_coefficient)
    }

    pub fn fling_duration_millis(&self, velocity: f32) -> u64 {
        if velocity == 0.0 || !velocity.is_finite() {
            return 0;
        }
        let l = self.spline_deceleration(velocity);
        (1000.0 * (l / (DECELERATION_RATE - 1.0)).exp()) as u64
    }

    pub fn fling_distance(&self, velocity: f32) -> f32 {
        if velocity == 0.0 || !velocity.is_finite() {
            return 0.0;
        }
        let l = self.spline_deceleration(velocity);
        self.friction
            * self.physical_coefficient
            * (DECELERATION_RATE / (DECELERATION_RATE - 1.0) * l).exp() as f32
    }

    pub fn fling_info(&self, velocity: f32) -> FlingInfo {
        FlingInfo {
            initial_velocity: velocity,
            distance: self.fling_distance(velocity),
            duration_millis: self.fling_duration_millis(velocity),
        }
    }
}

/// A decay curve for a single `f32` component.
///
/// Multi-component values decay each component independently.
pub trait FloatDecayAnimationSpec {
    /// Speed below which the decay counts as stopped.
    fn abs_velocity_threshold(&self) -> f32;

    fn value_from_nanos(&self, play_time_nanos: u64, initial_value: f32, initial_velocity: f32)
        -> f32;

    fn velocity_from_nanos(
        &self,
        play_time_nanos: u64,
        initial_value: f32,
        initial_velocity: f32,
    ) -> f32;

    fn duration_nanos(&self, initial_value: f32, initial_velocity: f32) -> u64;

    /// Where the decay comes to rest.
    fn target_value(&self, initial_value: f32, initial_velocity: f32) -> f32;
}

/// Resting point of a decay started at `value` with `velocity`, per component.
pub fn calculate_target_value<T: AnimationVector>(
    decay: &dyn FloatDecayAnimationSpec,
    value: T,
    velocity: T,
) -> T {
    value.map_components(|index, component| {
        decay.target_value(component, velocity.component(index))
    })
}

/// Fling decay following the scroller deceleration spline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineBasedDecaySpec {
    calculator: FlingCalculator,
}

impl SplineBasedDecaySpec {
    pub fn new(density: f32) -> Self {
        Self {
            calculator: FlingCalculator::with_density(density),
        }
    }

    pub fn with_calculator(calculator: FlingCalculator) -> Self {
        Self { calculator }
    }
}

impl FloatDecayAnimationSpec for SplineBasedDecaySpec {
    fn abs_velocity_threshold(&self) -> f32 {
        0.0
    }

    fn value_from_nanos(
        &self,
        play_time_nanos: u64,
        initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        let info = self.calculator.fling_info(initial_velocity);
        initial_value + info.position(play_time_nanos / 1_000_000)
    }

    fn velocity_from_nanos(
        &self,
        play_time_nanos: u64,
        _initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        let info = self.calculator.fling_info(initial_velocity);
        info.velocity(play_time_nanos / 1_000_000)
    }

    fn duration_nanos(&self, _initial_value: f32, initial_velocity: f32) -> u64 {
        self.calculator.fling_duration_millis(initial_velocity) * 1_000_000
    }

    fn target_value(&self, initial_value: f32, initial_velocity: f32) -> f32 {
        initial_value + self.calculator.fling_distance(initial_velocity) * initial_velocity.signum()
    }
}

/// Friction decay: velocity falls off exponentially with time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecaySpec {
    friction: f32,
    abs_velocity_threshold: f32,
}

impl ExponentialDecaySpec {
    const FRICTION_SCALE: f32 = -4.2;

    /// `friction_multiplier` > 1 stops sooner; `abs_velocity_threshold` is in
    /// units per second.
    pub fn new(friction_multiplier: f32, abs_velocity_threshold: f32) -> Self {
        Self {
            friction: Self::FRICTION_SCALE * friction_multiplier.max(0.0001),
            abs_velocity_threshold: abs_velocity_threshold.abs().max(0.0001),
        }
    }
}

impl Default for ExponentialDecaySpec {
    fn default() -> Self {
        Self::new(1.0, 0.1)
    }
}

impl FloatDecayAnimationSpec for ExponentialDecaySpec {
    fn abs_velocity_threshold(&self) -> f32 {
        self.abs_velocity_threshold
    }

    fn value_from_nanos(
        &self,
        play_time_nanos: u64,
        initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        let seconds = play_time_nanos as f32 / 1e9;
        initial_value - initial_velocity / self.friction
            + initial_velocity / self.friction * (self.friction * seconds).exp()
    }

    fn velocity_from_nanos(
        &self,
        play_time_nanos: u64,
        _initial_value: f32,
        initial_velocity: f32,
    ) -> f32 {
        let seconds = play_time_nanos as f32 / 1e9;
        initial_velocity * (self.friction * seconds).exp()
    }

    fn duration_nanos(&self, _initial_value: f32, initial_velocity: f32) -> u64 {
        if initial_velocity.abs() <= self.abs_velocity_threshold || !initial_velocity.is_finite() {
            return 0;
        }
        let seconds = (self.abs_velocity_threshold / initial_velocity.abs()).ln() / self.friction;
        (seconds * 1e9) as u64
    }

    fn target_value(&self, initial_value: f32, initial_velocity: f32) -> f32 {
        if initial_velocity.abs() <= self.abs_velocity_threshold || !initial_velocity.is_finite() {
            return initial_value;
        }
        let duration = self.duration_nanos(initial_value, initial_velocity);
        self.value_from_nanos(duration, initial_value, initial_velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_ui_graphics::Offset;

    #[test]
    fn spline_starts_at_zero_and_ends_at_one() {
        assert!(FlingSpline::sample(0.0).distance_fraction.abs() < 0.01);
        assert!((FlingSpline::sample(1.0).distance_fraction - 1.0).abs() < 0.01);
    }

    #[test]
    fn spline_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let sample = FlingSpline::sample(i as f32 / 100.0);
            assert!(sample.distance_fraction >= prev);
            prev = sample.distance_fraction;
        }
    }

    #[test]
    fn faster_flings_travel_further() {
        let calc = FlingCalculator::with_density(2.0);
        let duration = calc.fling_duration_millis(5000.0);
        let distance = calc.fling_distance(5000.0);
        assert!(duration > 0);
        assert!(distance > 0.0);
        assert!(calc.fling_duration_millis(10000.0) > duration);
        assert!(calc.fling_distance(10000.0) > distance);
    }

    #[test]
    fn zero_velocity_fling_is_empty() {
        let info = FlingCalculator::with_density(1.0).fling_info(0.0);
        assert_eq!(info.duration_millis, 0);
        assert_eq!(info.distance, 0.0);
        assert_eq!(info.velocity(0), 0.0);
        assert!(info.is_finished(0));
    }

    #[test]
    fn spline_decay_ends_at_target() {
        let spec = SplineBasedDecaySpec::new(2.0);
        let start = spec.value_from_nanos(0, 100.0, 5000.0);
        assert!((start - 100.0).abs() < 1.0);

        let duration = spec.duration_nanos(100.0, 5000.0);
        let target = spec.target_value(100.0, 5000.0);
        let end = spec.value_from_nanos(duration, 100.0, 5000.0);
        assert!((end - target).abs() < 10.0, "end {end} target {target}");
    }

    #[test]
    fn negative_velocity_moves_backwards() {
        let info = FlingCalculator::with_density(2.0).fling_info(-5000.0);
        assert!(info.position(info.duration_millis / 2) < 0.0);
        assert!(info.velocity(info.duration_millis / 2) < 0.0);
    }

    #[test]
    fn exponential_decay_rests_where_velocity_drops_below_threshold() {
        let spec = ExponentialDecaySpec::default();
        let target = spec.target_value(0.0, 1000.0);
        // v / 4.2 minus the sliver left once velocity reaches the threshold.
        assert!((target - 1000.0 / 4.2).abs() < 0.1, "target {target}");

        let duration = spec.duration_nanos(0.0, 1000.0);
        let velocity = spec.velocity_from_nanos(duration, 0.0, 1000.0);
        assert!((velocity - 0.1).abs() < 0.01);
        assert_eq!(spec.target_value(5.0, 0.05), 5.0);
    }

    #[test]
    fn target_value_is_computed_per_component() {
        let spec = SplineBasedDecaySpec::new(1.0);
        let target = calculate_target_value(&spec, Offset::new(10.0, 10.0), Offset::new(2000.0, 0.0));
        assert!(target.x > 10.0);
        assert_eq!(target.y, 10.0);
    }
}
