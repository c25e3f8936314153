//! Integration test: axis initialization.

use std::time::Duration;

use hbs_common::fault::Fault;
use hbs_common::io::Sensor;
use hbs_common::types::{Axis, SystemStatus, YPosition};

use super::rig::carriage;

#[test]
fn defined_axes_need_no_motion() {
    let (mut c, _clock) = carriage([4.0, 1.0, 3.0]);
    assert_eq!(c.init_x(), Ok(()));
    assert_eq!(c.init_z(), Ok(()));
    assert_eq!(c.init_y(), Ok(()));
    assert_eq!(c.io().output_writes(), 0);
}

#[test]
fn x_between_sensors_finds_the_next_one() {
    let (mut c, _clock) = carriage([4.5, 1.0, 3.0]);
    assert_eq!(c.init_x(), Ok(()));
    assert_eq!(c.x(), Some(4));
    assert!(c.io().energized().is_empty());
}

#[test]
fn x_at_lower_stop_sweeps_back_up() {
    // Below column 1 the down sweep finds nothing; the up sweep finds column 1.
    let (mut c, _clock) = carriage([0.75, 1.0, 3.0]);
    assert_eq!(c.init_x(), Ok(()));
    assert_eq!(c.x(), Some(1));
}

#[test]
fn z_between_sensors_finds_the_next_one() {
    let (mut c, _clock) = carriage([4.0, 1.0, 6.5]);
    assert_eq!(c.init_z(), Ok(()));
    assert_eq!(c.z(), Some(6));
}

#[test]
fn y_always_ends_at_default() {
    let (mut c, _clock) = carriage([4.0, 0.5, 3.0]);
    assert_eq!(c.init_y(), Ok(()));
    assert_eq!(c.y(), Some(YPosition::Default));

    let (mut c, _clock) = carriage([4.0, 2.0, 3.0]);
    assert_eq!(c.init_y(), Ok(()));
    assert_eq!(c.y(), Some(YPosition::Default));
}

#[test]
fn no_sensor_anywhere_is_an_initialization_error() {
    let (mut c, _clock) = carriage([4.5, 1.0, 3.0]);
    for n in 1..=10 {
        c.io_mut().fail_sensor(Sensor::X(n));
    }
    assert_eq!(c.init_x(), Err(Fault::InitializationError(Axis::X)));
    assert_eq!(c.status(), SystemStatus::Error);
    assert!(c.io().energized().is_empty());
}

#[test]
fn emergency_stop_during_sweep() {
    let (mut c, _clock) = carriage([4.0, 1.0, 6.5]);
    c.io_mut().schedule_emergency_stop(Duration::from_millis(20));
    assert_eq!(c.init_z(), Err(Fault::EmergencyStop));
    assert!(c.io().energized().is_empty());
}
