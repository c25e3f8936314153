//! Integration test: single-axis moves.

use std::time::Duration;

use hbs_common::fault::Fault;
use hbs_common::io::{DigitalIo, Outputs, Sensor};
use hbs_common::time::Clock;
use hbs_common::types::{Axis, SystemStatus, YPosition};

use super::rig::{carriage, elapsed};

#[test]
fn move_to_current_position_writes_nothing() {
    let (mut c, _clock) = carriage([4.0, 1.0, 3.0]);
    assert_eq!(c.move_x(4), Ok(()));
    assert_eq!(c.move_y(YPosition::Default), Ok(()));
    assert_eq!(c.move_z(3), Ok(()));
    assert_eq!(c.io().output_writes(), 0);
    assert_eq!(c.status(), SystemStatus::Ready);
}

#[test]
fn out_of_range_targets_are_rejected_before_actuation() {
    let (mut c, _clock) = carriage([4.0, 1.0, 3.0]);
    assert_eq!(c.move_x(11), Err(Fault::WrongTarget(Axis::X)));
    assert_eq!(c.move_x(0), Err(Fault::WrongTarget(Axis::X)));
    assert_eq!(c.move_z(11), Err(Fault::WrongTarget(Axis::Z)));
    assert_eq!(c.move_z(0), Err(Fault::WrongTarget(Axis::Z)));
    assert_eq!(c.move_y_rank(-1), Err(Fault::WrongTarget(Axis::Y)));
    assert_eq!(c.move_y_rank(3), Err(Fault::WrongTarget(Axis::Y)));
    assert_eq!(c.io().output_writes(), 0);
}

#[test]
fn move_x_reaches_target_and_releases_outputs() {
    let (mut c, _clock) = carriage([4.0, 1.0, 3.0]);
    assert_eq!(c.move_x(7), Ok(()));
    assert_eq!(c.x(), Some(7));
    assert!(c.io().energized().is_empty());
    assert_eq!(c.status(), SystemStatus::Ready);
}

#[test]
fn move_y_rank_accepts_valid_rank() {
    let (mut c, _clock) = carriage([4.0, 1.0, 3.0]);
    assert_eq!(c.move_y_rank(2), Ok(()));
    assert_eq!(c.y(), Some(YPosition::Insert));
    assert_eq!(c.move_y(YPosition::Retract), Ok(()));
    assert_eq!(c.y(), Some(YPosition::Retract));
}

#[test]
fn long_travel_outlasts_stall_window() {
    // Nine columns take longer than one X window; every crossed sensor renews it.
    let (mut c, clock) = carriage([10.0, 1.0, 1.0]);
    let start = clock.now();
    assert_eq!(c.move_x(1), Ok(()));
    assert!(elapsed(&clock, start) > c.motion_config().x_timeout());
    assert_eq!(c.x(), Some(1));
}

#[test]
fn x_refuses_to_move_unless_y_at_default() {
    let (mut c, _clock) = carriage([4.0, 2.0, 3.0]);
    assert_eq!(c.move_x(6), Err(Fault::YNotDefault));
    assert_eq!(c.io().output_writes(), 0);
    assert_eq!(c.status(), SystemStatus::Error);

    // Z has no interlock.
    assert_eq!(c.move_z(4), Ok(()));
    assert_eq!(c.status(), SystemStatus::Ready);
}

#[test]
fn undefined_start_is_rejected() {
    let (mut c, _clock) = carriage([4.5, 1.0, 3.0]);
    assert_eq!(c.move_x(6), Err(Fault::UndefinedPosition(Axis::X)));
    assert_eq!(c.io().output_writes(), 0);

    let (mut c, _clock) = carriage([4.0, 1.5, 3.0]);
    assert_eq!(c.move_y(YPosition::Insert), Err(Fault::UndefinedPosition(Axis::Y)));
}

#[test]
fn jammed_axis_reports_position_error() {
    let (mut c, clock) = carriage([4.0, 1.0, 3.0]);
    c.io_mut().jam(Axis::Z, true);
    let start = clock.now();
    assert_eq!(c.move_z(6), Err(Fault::PositionError(Axis::Z)));
    assert!(elapsed(&clock, start) >= c.motion_config().z_timeout());
    assert!(c.io().energized().is_empty());
    assert_eq!(c.status(), SystemStatus::Error);

    // A successful move clears the sticky error.
    c.io_mut().jam(Axis::Z, false);
    assert_eq!(c.move_z(5), Ok(()));
    assert_eq!(c.status(), SystemStatus::Ready);
}

#[test]
fn silent_target_sensor_is_a_position_error() {
    let (mut c, _clock) = carriage([4.0, 1.0, 3.0]);
    c.io_mut().fail_sensor(Sensor::X(6));
    assert_eq!(c.move_x(6), Err(Fault::PositionError(Axis::X)));
    assert!(c.io().energized().is_empty());
}

#[test]
fn emergency_stop_halts_within_one_tick() {
    let (mut c, clock) = carriage([10.0, 1.0, 1.0]);
    let pressed_at = clock.now() + Duration::from_millis(300);
    c.io_mut().schedule_emergency_stop(Duration::from_millis(300));

    assert_eq!(c.move_x(1), Err(Fault::EmergencyStop));
    assert!(clock.now() >= pressed_at);
    assert!(clock.now() <= pressed_at + c.motion_config().tick());
    assert!(c.io().energized().is_empty());
    assert_eq!(c.status(), SystemStatus::Error);
    assert_eq!(c.x(), None);
}

#[test]
fn held_emergency_stop_blocks_until_released() {
    let (mut c, _clock) = carriage([4.0, 1.0, 3.0]);
    c.io_mut().press_emergency_stop();
    assert_eq!(c.move_z(5), Err(Fault::EmergencyStop));
    assert_eq!(c.z(), Some(3));
    assert!(c.io().energized().is_empty());

    c.io_mut().release_emergency_stop();
    assert_eq!(c.move_z(5), Ok(()));
    assert_eq!(c.status(), SystemStatus::Ready);
}

#[test]
fn move_home_visits_y_then_z_then_x() {
    let (mut c, _clock) = carriage([3.0, 2.0, 5.0]);
    assert_eq!(c.move_home(), Ok(()));
    assert_eq!(c.x(), Some(10));
    assert_eq!(c.y(), Some(YPosition::Default));
    assert_eq!(c.z(), Some(1));
}

#[test]
fn stop_motion_clears_everything() {
    let (mut c, _clock) = carriage([3.0, 1.0, 5.0]);
    c.io_mut().set_outputs(Outputs::X_UP | Outputs::OUTPUT_CONVEYOR, true);
    c.stop_motion();
    assert!(c.io().energized().is_empty());
}
