use super::*;

use lightbox_testing::{FrameHarness, PointerRobot, FRAME_NANOS};
use lightbox_ui_graphics::Velocity;

use crate::photo::PhotoItem;
use crate::state::PhotoList;

const VIEWPORT: Size = Size::new(1000.0, 2000.0);
const CENTER: Offset = Offset::new(500.0, 1000.0);

fn photos(count: usize) -> PhotoList {
    (0..count)
        .map(|i| PhotoItem::new(format!("https://example.com/{i}.jpg")).into_ref())
        .collect::<Vec<_>>()
        .into()
}

fn mounted(harness: &FrameHarness) -> LightboxHost {
    let mut host = LightboxHost::mount(LightboxState::new(), harness.handle());
    host.on_layout(VIEWPORT, 1.0, LayoutDirection::Ltr);
    host
}

fn feed(host: &mut LightboxHost, events: &[PointerEvent]) {
    for event in events {
        host.on_pointer_event(event);
    }
}

/// Runs frames from `now_millis` until nothing is animating or pending.
fn settle(harness: &FrameHarness, host: &mut LightboxHost, now_millis: u64) -> u64 {
    let mut now = now_millis * 1_000_000;
    for _ in 0..5_000 {
        if harness.is_idle() && !host.needs_frame() && !host.state().is_animating() {
            return now;
        }
        now += FRAME_NANOS;
        host.on_frame(now);
    }
    panic!("host still busy: {:?}", host.state());
}

#[test]
fn swipe_down_dismisses_the_viewer() {
    let harness = FrameHarness::new();
    let mut host = mounted(&harness);
    let list = photos(2);
    host.state().open(&list[0].clone(), list, None);

    let mut robot = PointerRobot::new();
    feed(&mut host, &robot.swipe(CENTER, Offset::new(0.0, 700.0), 10));
    assert!(!host.state().is_open());
    assert!(host.frame().scrim_alpha < 1.0);

    settle(&harness, &mut host, robot.now_millis());
    let state = host.state();
    assert_eq!(state.photo_list(), None);
    assert_eq!(state.motion(), Motion::None);
    assert_eq!(host.frame().current, None);
}

#[test]
fn swipe_left_pages_to_the_next_photo() {
    let harness = FrameHarness::new();
    let mut host = mounted(&harness);
    let list = photos(3);
    host.state().open(&list[0], list.clone(), None);

    let mut robot = PointerRobot::new();
    feed(&mut host, &robot.swipe(CENTER, Offset::new(-700.0, 0.0), 10));
    settle(&harness, &mut host, robot.now_millis());

    assert_eq!(host.state().current_index(), 1);
    let frame = host.frame();
    assert_eq!(frame.image_offset, Offset::ZERO);
    assert_eq!(frame.previous.as_ref(), Some(&list[0]));
    assert_eq!(frame.current.as_ref(), Some(&list[1]));
}

#[test]
fn single_tap_toggles_the_hud_after_the_double_tap_window() {
    let harness = FrameHarness::new();
    let mut host = mounted(&harness);
    let list = photos(1);
    host.state().open(&list[0].clone(), list, None);
    assert!(host.state().hud_visible());

    let mut robot = PointerRobot::new();
    feed(&mut host, &robot.tap(CENTER, 50));
    assert!(host.state().hud_visible(), "tap held back while a double tap is possible");
    assert!(host.needs_frame());

    host.on_frame(400 * 1_000_000);
    assert!(!host.state().hud_visible());
    assert!(host.frame().hide_system_ui);
}

#[test]
fn double_tap_zooms_in_on_the_photo() {
    let harness = FrameHarness::new();
    let mut host = mounted(&harness);
    let list = photos(1);
    host.state().open(&list[0].clone(), list, None);

    let mut robot = PointerRobot::new();
    feed(&mut host, &robot.tap(CENTER, 40));
    robot.advance(100);
    feed(&mut host, &robot.tap(CENTER, 40));
    assert_eq!(host.state().scale_target(), 4.0);
    assert!(!host.state().hud_visible());

    settle(&harness, &mut host, robot.now_millis());
    assert_eq!(host.frame().image_scale, 4.0);
    assert!(!host.state().hud_visible(), "no stray single tap");
}

#[test]
fn sub_slop_press_does_not_resolve_a_gesture() {
    let harness = FrameHarness::new();
    let mut host = mounted(&harness);
    let list = photos(1);
    host.state().open(&list[0].clone(), list, None);
    host.state().set_hud_visible(false);

    let mut robot = PointerRobot::new();
    feed(&mut host, &robot.swipe(CENTER, Offset::new(3.0, 3.0), 2));
    // A resolved gesture would have brought the HUD back.
    assert!(!host.state().hud_visible());
    assert_eq!(host.state().motion(), Motion::None);
}

#[test]
fn density_raises_the_touch_slop() {
    let harness = FrameHarness::new();
    let mut host = mounted(&harness);
    host.on_layout(VIEWPORT, 3.0, LayoutDirection::Ltr);
    let list = photos(2);
    host.state().open(&list[0].clone(), list, None);

    let mut robot = PointerRobot::new();
    feed(&mut host, &[robot.down(0, CENTER)]);
    feed(&mut host, &[robot.move_by(0, Offset::new(0.0, 20.0))]);
    assert_eq!(host.state().pan(), Offset::ZERO, "20px is within 8dp at 3x");

    feed(&mut host, &[robot.move_by(0, Offset::new(0.0, 60.0))]);
    assert_eq!(host.state().motion(), Motion::Dismiss);
    // The platform takes the stream away; the gesture still resolves.
    host.cancel_input();
    settle(&harness, &mut host, robot.now_millis());
    assert_eq!(host.state().motion(), Motion::None);
    feed(&mut host, &[robot.move_by(0, Offset::new(0.0, 60.0))]);
    assert_eq!(host.state().motion(), Motion::None, "canceled session stays over");
}

#[test]
fn pointer_input_is_ignored_while_closed() {
    let harness = FrameHarness::new();
    let mut host = mounted(&harness);

    let mut robot = PointerRobot::new();
    feed(&mut host, &robot.swipe(CENTER, Offset::new(0.0, 700.0), 5));
    assert_eq!(host.state().motion(), Motion::None);
    assert_eq!(host.state().pan(), Offset::ZERO);
    assert!(!host.needs_frame());
}

#[test]
fn frame_reports_render_numbers() {
    let harness = FrameHarness::new();
    let mut host = mounted(&harness);
    let list = photos(3);
    host.state().open(&list[1].clone(), list, None);

    host.state().drag_in_progress(1.0, Offset::new(-250.0, 0.0));
    let frame = host.frame();
    assert!(frame.open);
    assert_eq!(frame.image_offset, Offset::new(-250.0, 0.0));
    assert_eq!(frame.previous_offset_x, -1250.0);
    assert_eq!(frame.next_offset_x, 750.0);
    assert_eq!(frame.current_index_fraction, 1.25);
    assert!(!frame.overscrolling);
    host.state().cancel_gesture();

    host.on_back_progress(0.125);
    let frame = host.frame();
    assert!((frame.image_scale - 0.9).abs() < 1e-6);
    assert!((frame.scrim_alpha - 0.7).abs() < 1e-6);
    assert_eq!(frame.image_alpha, 1.0);
    assert_eq!(frame.previous_offset_x, -1000.0);
    assert!(!frame.hide_system_ui);

    host.on_back_committed();
    settle(&harness, &mut host, 0);
    assert_eq!(host.frame().image_alpha, 0.0);
    assert!(!host.frame().open);
}

#[test]
fn right_to_left_frames_are_mirrored() {
    let harness = FrameHarness::new();
    let mut host = mounted(&harness);
    host.on_layout(VIEWPORT, 1.0, LayoutDirection::Rtl);
    let list = photos(3);
    host.state().open(&list[1].clone(), list, None);

    let mut robot = PointerRobot::new();
    feed(&mut host, &[robot.down(0, CENTER)]);
    feed(&mut host, &[robot.move_by(0, Offset::new(100.0, 0.0))]);
    let frame = host.frame();
    assert!(frame.image_offset.x > 0.0, "photo follows the finger");
    assert!(frame.next_offset_x < 0.0, "next photo waits on the left");
    assert!(frame.previous_offset_x > 0.0);
    assert!(frame.current_index_fraction > 1.0);
}

#[test]
fn dropping_the_host_detaches_the_state() {
    let harness = FrameHarness::new();
    let host = mounted(&harness);
    let state = host.state().clone();
    let list = photos(2);
    state.open(&list[0].clone(), list, None);
    state.close();
    harness.advance_frame();
    assert!(state.is_attached());

    drop(host);
    assert!(!state.is_attached());
    assert_eq!(state.photo_list(), None);
    assert!(harness.is_idle());

    state.open(&photos(1)[0], Vec::new(), None);
    state.transform_ended(Velocity::ZERO);
    assert!(state.is_open());
}
