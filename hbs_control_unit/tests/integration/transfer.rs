//! Integration test: box transfer choreographies.

use std::time::Duration;

use hbs_common::fault::Fault;
use hbs_common::io::{Outputs, Sensor};
use hbs_common::time::Clock;
use hbs_common::types::{Axis, SystemStatus, YPosition};

use super::rig::{HOME, carriage, coord, elapsed};

#[test]
fn fetch_picks_box_from_input_dock() {
    let (mut c, _clock) = carriage(HOME);
    c.io_mut().load_input_belt(1);
    assert_eq!(c.fetch_from_input(), Ok(()));
    assert!(c.io_mut().carriage_loaded());
    assert!(!c.io_mut().input_dock_loaded());
    assert_eq!(c.x(), Some(10));
    assert_eq!(c.y(), Some(YPosition::Default));
    assert_eq!(c.z(), Some(2));
}

#[test]
fn fetch_without_box_is_an_input_belt_error() {
    let (mut c, clock) = carriage(HOME);
    let start = clock.now();
    assert_eq!(c.fetch_from_input(), Err(Fault::InputBeltError));
    assert!(elapsed(&clock, start) >= c.conveyor_config().input_timeout());
    assert!(!c.io().energized().intersects(Outputs::INPUT_CONVEYOR));
    assert_eq!(c.status(), SystemStatus::Error);
    assert!(!c.io_mut().carriage_loaded());
}

#[test]
fn dead_light_barrier_is_an_input_belt_error() {
    let (mut c, _clock) = carriage(HOME);
    c.io_mut().load_input_belt(1);
    c.io_mut().fail_sensor(Sensor::InputBarrier);
    assert_eq!(c.fetch_from_input(), Err(Fault::InputBeltError));
}

#[test]
fn emergency_stop_during_input_belt() {
    let (mut c, clock) = carriage(HOME);
    // Only Z 1 to 2 precedes the belt; it runs by 2 s with no box arriving.
    c.io_mut().schedule_emergency_stop(Duration::from_secs(2));
    let start = clock.now();
    assert_eq!(c.fetch_from_input(), Err(Fault::EmergencyStop));
    assert!(elapsed(&clock, start) < c.conveyor_config().input_timeout());
    assert!(c.io().energized().is_empty());
    assert_eq!(c.status(), SystemStatus::Error);
    assert!(!c.io_mut().carriage_loaded());
}

#[test]
fn store_sets_box_down_on_shelf() {
    let (mut c, _clock) = carriage([10.0, 1.0, 2.0]);
    c.io_mut().set_carriage_loaded(true);
    assert_eq!(c.store_to_shelf(3, 2), Ok(()));
    assert!(c.io_mut().shelf_occupied(coord(3, 2)));
    assert!(!c.io_mut().carriage_loaded());
    assert_eq!(c.z(), Some(3));
    assert_eq!(c.y(), Some(YPosition::Default));
}

#[test]
fn retrieve_lifts_box_from_shelf() {
    let (mut c, _clock) = carriage(HOME);
    c.io_mut().set_shelf(coord(7, 4), true);
    assert_eq!(c.retrieve_from_shelf(7, 4), Ok(()));
    assert!(c.io_mut().carriage_loaded());
    assert!(!c.io_mut().shelf_occupied(coord(7, 4)));
    assert_eq!(c.z(), Some(8));
}

#[test]
fn drop_delivers_box_through_output_dock() {
    let (mut c, clock) = carriage([5.0, 1.0, 6.0]);
    c.io_mut().set_carriage_loaded(true);
    let start = clock.now();
    assert_eq!(c.drop_to_output(), Ok(()));
    assert!(elapsed(&clock, start) >= c.conveyor_config().output_run());
    assert_eq!(c.io_mut().delivered(), 1);
    assert!(c.io().energized().is_empty());
    assert_eq!((c.x(), c.z()), (Some(1), Some(1)));
}

#[test]
fn invalid_shelf_is_rejected_without_motion() {
    let (mut c, _clock) = carriage(HOME);
    assert_eq!(c.store_to_shelf(0, 1), Err(Fault::WrongTarget(Axis::X)));
    assert_eq!(c.store_to_shelf(1, 6), Err(Fault::WrongZLevel));
    assert_eq!(c.retrieve_from_shelf(11, 2), Err(Fault::WrongTarget(Axis::X)));
    assert_eq!(c.retrieve_from_shelf(2, 0), Err(Fault::WrongZLevel));
    assert_eq!(c.io().output_writes(), 0);
}

#[test]
fn failing_step_aborts_chain() {
    let (mut c, _clock) = carriage(HOME);
    c.io_mut().set_shelf(coord(2, 3), true);
    c.io_mut().jam(Axis::Y, true);
    assert_eq!(c.retrieve_from_shelf(2, 3), Err(Fault::PositionError(Axis::Y)));
    // Y never reached INSERT; Z stays below the shelf floor.
    assert_eq!(c.z(), Some(5));
    assert!(c.io_mut().shelf_occupied(coord(2, 3)));
}

#[test]
fn emergency_stop_during_output_belt() {
    let (mut c, clock) = carriage([1.0, 1.0, 2.0]);
    c.io_mut().set_carriage_loaded(true);
    // Y out and back (2 × 0.5 s), Z down (0.33 s), settles: the belt runs by 3 s.
    c.io_mut().schedule_emergency_stop(Duration::from_secs(3));
    let start = clock.now();
    assert_eq!(c.drop_to_output(), Err(Fault::EmergencyStop));
    assert!(elapsed(&clock, start) < c.conveyor_config().output_run());
    assert!(c.io().energized().is_empty());
}
