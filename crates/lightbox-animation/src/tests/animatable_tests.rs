use super::*;

use std::cell::{Cell, RefCell};

use lightbox_core::StateObservers;
use lightbox_testing::FrameHarness;
use lightbox_ui_graphics::Offset;

use crate::animation::{AnimationSpec, SpringSpec};
use crate::decay_spec::{ExponentialDecaySpec, SplineBasedDecaySpec};

type Slot<T> = Rc<RefCell<Option<AnimationResult<T>>>>;

fn spawn_into<T: AnimationVector>(
    harness: &FrameHarness,
    future: impl Future<Output = AnimationResult<T>> + 'static,
) -> Slot<T> {
    let slot: Slot<T> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&slot);
    harness.spawn(async move {
        let result = future.await;
        *sink.borrow_mut() = Some(result);
    });
    slot
}

#[test]
fn tween_reaches_target_through_intermediate_values() {
    let harness = FrameHarness::new();
    let clock = harness.clock();
    let value = Animatable::new(0.0f32);

    let slot = spawn_into(
        &harness,
        value.animate_to(
            &clock,
            1.0,
            AnimationType::Tween(AnimationSpec::linear(100)),
            None,
        ),
    );
    assert!(value.is_running());
    assert_eq!(value.target_value(), 1.0);

    let mut samples = Vec::new();
    while slot.borrow().is_none() {
        harness.advance_frame();
        samples.push(value.value());
    }

    assert!(samples.iter().any(|v| *v > 0.0 && *v < 1.0));
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    let result = slot.borrow().expect("finished");
    assert_eq!(result.end_reason, AnimationEndReason::Finished);
    assert_eq!(result.end_state.value, 1.0);
    assert_eq!(value.value(), 1.0);
    assert!(!value.is_running());
}

#[test]
fn snap_supersedes_running_animation() {
    let harness = FrameHarness::new();
    let clock = harness.clock();
    let value = Animatable::new(0.0f32);
    let slot = spawn_into(
        &harness,
        value.animate_to(&clock, 10.0, AnimationType::tween(500), None),
    );
    harness.advance_frame();
    harness.advance_frame();

    value.snap_to(3.0);
    harness.advance_frame();

    let result = slot.borrow().expect("resolved after snap");
    assert!(result.is_superseded());
    assert_eq!(result.end_state.value, 3.0);
    assert_eq!(value.value(), 3.0);
    assert_eq!(value.target_value(), 3.0);
    assert!(!value.is_running());
}

#[test]
fn newer_animation_wins_even_before_first_poll() {
    let harness = FrameHarness::new();
    let clock = harness.clock();
    let value = Animatable::new(Offset::ZERO);

    let first = spawn_into(
        &harness,
        value.animate_to(&clock, Offset::new(100.0, 0.0), AnimationType::tween(200), None),
    );
    let second_future =
        value.animate_to(&clock, Offset::new(0.0, 50.0), AnimationType::tween(200), None);
    assert_eq!(value.target_value(), Offset::new(0.0, 50.0));

    let second = spawn_into(&harness, second_future);
    harness.run_until_idle();

    assert!(first.borrow().expect("first resolved").is_superseded());
    assert!(second.borrow().expect("second resolved").is_finished());
    assert_eq!(value.value(), Offset::new(0.0, 50.0));
}

#[test]
fn spring_carries_initial_velocity_and_settles() {
    let harness = FrameHarness::new();
    let clock = harness.clock();
    let value = Animatable::new(0.0f32).with_visibility_threshold(0.5);

    let slot = spawn_into(
        &harness,
        value.animate_to(
            &clock,
            0.0,
            AnimationType::Spring(SpringSpec::default()),
            Some(2000.0),
        ),
    );
    harness.advance_frame();
    harness.advance_frame();
    assert!(value.value() > 0.0, "velocity should push the value forward");

    harness.run_until_idle();
    let result = slot.borrow().expect("spring finished");
    assert!(result.is_finished());
    assert_eq!(value.value(), 0.0);
    assert_eq!(value.velocity(), 0.0);
}

#[test]
fn decay_stops_at_bound_and_reports_velocity() {
    let harness = FrameHarness::new();
    let clock = harness.clock();
    let value = Animatable::new(Offset::ZERO);
    value.update_bounds(
        Some(Offset::new(-50.0, -1000.0)),
        Some(Offset::new(50.0, 1000.0)),
    );

    let slot = spawn_into(
        &harness,
        value.animate_decay(&clock, Offset::new(5000.0, 100.0), SplineBasedDecaySpec::new(1.0)),
    );
    harness.run_until_idle();

    let result = slot.borrow().expect("decay resolved");
    assert_eq!(result.end_reason, AnimationEndReason::BoundReached);
    assert_eq!(result.end_state.value.x, 50.0);
    assert!(result.end_state.velocity.x > 0.0);
    assert!(result.end_state.velocity.y > 0.0, "free axis keeps its velocity");
    assert_eq!(value.value().x, 50.0);
    assert!(!value.is_running());
}

#[test]
fn decay_without_bounds_rests_at_predicted_target() {
    let harness = FrameHarness::new();
    let clock = harness.clock();
    let value = Animatable::new(10.0f32);
    let decay = ExponentialDecaySpec::default();
    let predicted = crate::decay_spec::calculate_target_value(&decay, 10.0f32, 420.0);

    let slot = spawn_into(&harness, value.animate_decay(&clock, 420.0, decay));
    harness.run_until_idle();

    assert!(slot.borrow().expect("resolved").is_finished());
    assert!((value.value() - predicted).abs() < 0.01);
    assert!((predicted - 110.0).abs() < 0.1, "predicted {predicted}");
}

#[test]
fn snap_is_clamped_to_bounds() {
    let value = Animatable::new(1.0f32);
    value.update_bounds(Some(0.5), Some(2.0));
    value.snap_to(5.0);
    assert_eq!(value.value(), 2.0);
    value.snap_to(0.0);
    assert_eq!(value.value(), 0.5);
    value.update_bounds(None, None);
    assert_eq!(value.lower_bound(), None);
}

#[test]
fn canceled_task_leaves_value_settled() {
    let harness = FrameHarness::new();
    let clock = harness.clock();
    let value = Animatable::new(0.0f32);
    let future = value.animate_to(&clock, 1.0, AnimationType::tween(300), None);
    let task = harness.spawn(async move {
        future.await;
    });
    harness.advance_frame();
    harness.advance_frame();
    let reached = value.value();

    task.cancel();
    assert!(!value.is_running());
    assert_eq!(value.target_value(), reached);
    assert_eq!(value.velocity(), 0.0);
    assert!(harness.is_idle());
}

#[test]
fn observers_hear_value_changes() {
    let observers = StateObservers::new();
    let count = Rc::new(Cell::new(0));
    let _subscription = {
        let count = Rc::clone(&count);
        observers.observe(move || count.set(count.get() + 1))
    };
    let value = Animatable::new(0.0f32).with_observers(observers);

    value.snap_to(0.0);
    assert_eq!(count.get(), 0);
    value.snap_to(1.0);
    assert_eq!(count.get(), 1);

    let harness = FrameHarness::new();
    let clock = harness.clock();
    spawn_into(
        &harness,
        value.animate_to(&clock, 2.0, AnimationType::tween(100), None),
    );
    harness.run_until_idle();
    assert!(count.get() > 2);
}
