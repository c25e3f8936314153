//! Integration test: simultaneous X+Z move.

use std::time::Duration;

use hbs_common::fault::Fault;
use hbs_common::io::Sensor;
use hbs_common::types::{Axis, SystemStatus};

use super::rig::carriage;

#[test]
fn both_axes_reach_their_targets() {
    let (mut c, _clock) = carriage([10.0, 1.0, 1.0]);
    assert_eq!(c.move_xz(3, 7), Ok(()));
    assert_eq!(c.x(), Some(3));
    assert_eq!(c.z(), Some(7));
    assert!(c.io().energized().is_empty());
}

#[test]
fn already_there_is_a_no_op() {
    let (mut c, _clock) = carriage([6.0, 1.0, 4.0]);
    assert_eq!(c.move_xz(6, 4), Ok(()));
    assert_eq!(c.io().output_writes(), 0);
}

#[test]
fn invalid_targets_fail_first() {
    let (mut c, _clock) = carriage([6.0, 1.0, 4.0]);
    assert_eq!(c.move_xz(0, 4), Err(Fault::WrongTarget(Axis::X)));
    assert_eq!(c.move_xz(6, 11), Err(Fault::WrongTarget(Axis::Z)));
    assert_eq!(c.io().output_writes(), 0);
}

#[test]
fn undefined_axes_are_rejected() {
    let (mut c, _clock) = carriage([6.0, 1.0, 4.5]);
    assert_eq!(c.move_xz(2, 2), Err(Fault::UndefinedPosition(Axis::Z)));
    let (mut c, _clock) = carriage([6.5, 1.0, 4.5]);
    assert_eq!(c.move_xz(2, 2), Err(Fault::UndefinedPosition(Axis::X)));
}

#[test]
fn interlock_applies_only_when_x_changes() {
    let (mut c, _clock) = carriage([6.0, 0.0, 4.0]);
    assert_eq!(c.move_xz(5, 4), Err(Fault::YNotDefault));
    assert_eq!(c.move_xz(6, 2), Ok(()));
    assert_eq!(c.z(), Some(2));
}

#[test]
fn z_without_sensors_fails_after_x_succeeds() {
    let (mut c, _clock) = carriage([4.0, 1.0, 2.0]);
    for n in 3..=10 {
        c.io_mut().fail_sensor(Sensor::Z(n));
    }
    assert_eq!(c.move_xz(5, 4), Err(Fault::PositionError(Axis::Z)));
    assert_eq!(c.x(), Some(5));
    assert!(c.io().energized().is_empty());
    assert_eq!(c.status(), SystemStatus::Error);
}

#[test]
fn stalled_x_aborts_whole_move_and_is_reported_first() {
    let (mut c, _clock) = carriage([4.0, 1.0, 1.0]);
    c.io_mut().jam(Axis::X, true);
    assert_eq!(c.move_xz(8, 9), Err(Fault::PositionError(Axis::X)));
    // Z was still travelling when X stalled.
    assert_ne!(c.z(), Some(9));
    assert!(c.io().energized().is_empty());
}

#[test]
fn emergency_stop_aborts_both_axes() {
    let (mut c, _clock) = carriage([10.0, 1.0, 1.0]);
    c.io_mut().schedule_emergency_stop(Duration::from_millis(500));
    assert_eq!(c.move_xz(1, 9), Err(Fault::EmergencyStop));
    assert!(c.io().energized().is_empty());
    assert_eq!(c.status(), SystemStatus::Error);
}
