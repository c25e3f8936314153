//! Result codes for every core operation.
//!
//! Every axis, transfer and storage operation returns [`MoveOutcome`].
//! Composite operations forward the first failing sub-step verbatim, so the
//! `Fault` that reaches the command transport names the step that broke.

use thiserror::Error;

use crate::types::Axis;

/// Outcome of a move, transfer or storage operation.
pub type MoveOutcome = Result<(), Fault>;

/// Result code of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    // ── Input validation ───────────
    /// Target outside the axis range.
    #[error("{0} target out of range")]
    WrongTarget(Axis),

    /// Shelf level outside `1..=5` passed to a transfer choreography.
    #[error("Z level out of range")]
    WrongZLevel,

    // ── Inventory state ────────────
    /// Slot already holds a box.
    #[error("shelf occupied")]
    ShelfOccupied,

    /// Slot holds no box.
    #[error("shelf empty")]
    ShelfEmpty,

    /// No free slot left.
    #[error("storage full")]
    StorageFull,

    /// No occupied slot left.
    #[error("storage empty")]
    StorageEmpty,

    /// A box is recorded as carried between two slots.
    #[error("box in transit from slot {0}")]
    BoxInTransit(u8),

    // ── Interlock / sensing ────────
    /// X may only move while Y is at DEFAULT.
    #[error("Y not at DEFAULT, horizontal move refused")]
    YNotDefault,

    /// No sensor of the axis is asserted.
    #[error("{0} position undefined")]
    UndefinedPosition(Axis),

    // ── Mechanical ────────────────
    /// Axis did not reach its target.
    #[error("{0} positioning unsuccessful")]
    PositionError(Axis),

    /// Light barrier still reports no box after the input belt ran.
    #[error("input belt error")]
    InputBeltError,

    // ── Initialization ─────────────
    /// Homing sweep found no sensor.
    #[error("{0} initialization unsuccessful")]
    InitializationError(Axis),

    // ── Safety ─────────────────────
    /// Emergency stop asserted during a wait loop.
    #[error("emergency stop")]
    EmergencyStop,

    // ── Persistence ────────────────
    /// Inventory snapshot could not be read or written.
    #[error("storage file error: {0}")]
    StorageIo(String),

    // ── Internal ───────────────────
    /// Unreachable-state guard.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Fault {
    /// Stable result code published on the command transport.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::WrongTarget(Axis::X) => "err_wrong_x_target",
            Self::WrongTarget(Axis::Y) => "err_wrong_y_target",
            Self::WrongTarget(Axis::Z) => "err_wrong_z_target",
            Self::WrongZLevel => "err_wrong_z_level",
            Self::ShelfOccupied => "err_shelf_occupied",
            Self::ShelfEmpty => "err_shelf_empty",
            Self::StorageFull => "err_storage_full",
            Self::StorageEmpty => "err_storage_empty",
            Self::BoxInTransit(_) => "err_box_in_transit",
            Self::YNotDefault => "err_y_not_default",
            Self::UndefinedPosition(Axis::X) => "err_x_udf",
            Self::UndefinedPosition(Axis::Y) => "err_y_udf",
            Self::UndefinedPosition(Axis::Z) => "err_z_udf",
            Self::PositionError(Axis::X) => "err_x_pos",
            Self::PositionError(Axis::Y) => "err_y_pos",
            Self::PositionError(Axis::Z) => "err_z_pos",
            Self::InputBeltError => "err_input_belt",
            Self::InitializationError(Axis::X) => "err_x_init",
            Self::InitializationError(Axis::Y) => "err_y_init",
            Self::InitializationError(Axis::Z) => "err_z_init",
            Self::EmergencyStop => "err_emrg_stop",
            Self::StorageIo(_) => "err_storage_io",
            Self::Internal(_) => "err_internal",
        }
    }

    /// Whether this fault forces `SystemStatus::Error`.
    ///
    /// Mechanical, sensing, initialization and safety faults do; inventory
    /// conflicts are ordinary refusals.
    pub const fn forces_error_status(&self) -> bool {
        matches!(
            self,
            Self::WrongTarget(_)
                | Self::WrongZLevel
                | Self::YNotDefault
                | Self::UndefinedPosition(_)
                | Self::PositionError(_)
                | Self::InputBeltError
                | Self::InitializationError(_)
                | Self::EmergencyStop
                | Self::Internal(_)
        )
    }
}

/// Result code of an outcome: `okay` on success.
pub fn outcome_code(outcome: &MoveOutcome) -> &'static str {
    match outcome {
        Ok(()) => "okay",
        Err(fault) => fault.code(),
    }
}
