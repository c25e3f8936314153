//! Command dispatch and status publishing.
//!
//! The [`Dispatcher`] runs one decoded command at a time against the
//! orchestrator and writes line-oriented replies:
//!
//! ```text
//! status BUSY
//! result okay
//! status READY
//! ```
//!
//! `status` lines are published only when the indicator changes. `result`
//! carries either a result code or, for `show_occupancy`, the summary string.

use std::fmt;
use std::io::{self, Write};

use hbs_common::fault::{MoveOutcome, outcome_code};
use hbs_common::io::DigitalIo;
use hbs_common::time::Clock;
use hbs_control_unit::StorageOrchestrator;
use tracing::{debug, info, warn};

use crate::command::{self, Command};

/// Console status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Idle, inventory has room.
    Ready,
    /// Running a command.
    Busy,
    /// Last command failed.
    Error,
    /// Idle, every slot occupied.
    Full,
    /// Process terminating.
    Exit,
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "READY",
            Self::Busy => "BUSY",
            Self::Error => "ERROR",
            Self::Full => "FULL",
            Self::Exit => "SYS_EXIT",
        };
        f.write_str(name)
    }
}

/// Whether the dispatch loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Wait for the next payload.
    Continue,
    /// `shutdown` received.
    Shutdown,
}

/// Runs commands against the orchestrator and publishes the replies to `out`.
pub struct Dispatcher<I: DigitalIo, C: Clock, W: Write> {
    orchestrator: StorageOrchestrator<I, C>,
    out: W,
    indicator: Option<Indicator>,
}

impl<I: DigitalIo, C: Clock, W: Write> Dispatcher<I, C, W> {
    /// Dispatcher publishing to `out`.
    pub fn new(orchestrator: StorageOrchestrator<I, C>, out: W) -> Self {
        Self {
            orchestrator,
            out,
            indicator: None,
        }
    }

    /// The orchestrator.
    pub fn orchestrator(&self) -> &StorageOrchestrator<I, C> {
        &self.orchestrator
    }

    /// The orchestrator, mutably.
    pub fn orchestrator_mut(&mut self) -> &mut StorageOrchestrator<I, C> {
        &mut self.orchestrator
    }

    /// The reply sink.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Last published indicator.
    pub fn indicator(&self) -> Option<Indicator> {
        self.indicator
    }

    /// Publish `status <NAME>` if `indicator` differs from the last one.
    pub fn publish_status(&mut self, indicator: Indicator) -> io::Result<()> {
        if self.indicator == Some(indicator) {
            return Ok(());
        }
        self.indicator = Some(indicator);
        debug!(%indicator, "Status indicator");
        writeln!(self.out, "status {indicator}")?;
        self.out.flush()
    }

    /// Publish `result <reply>`.
    pub fn publish_result(&mut self, reply: &str) -> io::Result<()> {
        writeln!(self.out, "result {reply}")?;
        self.out.flush()
    }

    /// Publish the idle indicator: FULL when no slot is free, READY otherwise.
    pub fn publish_idle(&mut self) -> io::Result<()> {
        let indicator = if self.orchestrator.inventory().is_full() {
            Indicator::Full
        } else {
            Indicator::Ready
        };
        self.publish_status(indicator)
    }

    /// Decode and run one payload.
    pub fn handle(&mut self, payload: &str) -> io::Result<Flow> {
        self.publish_status(Indicator::Busy)?;

        let (reply, flow) = match command::decode(payload) {
            Ok(Command::Shutdown) => {
                info!("Shutdown requested");
                ("shutdown".to_string(), Flow::Shutdown)
            }
            Ok(Command::ShowOccupancy) => {
                info!("\n{}", self.orchestrator.inventory().render_grid());
                (self.orchestrator.show_occupancy(), Flow::Continue)
            }
            Ok(cmd) => {
                let outcome = self.execute(cmd);
                (outcome_code(&outcome).to_string(), Flow::Continue)
            }
            Err(err) => {
                warn!(%err, "Payload rejected");
                (err.code().to_string(), Flow::Continue)
            }
        };

        self.publish_result(&reply)?;
        if reply.starts_with("err_") {
            self.publish_status(Indicator::Error)?;
        } else if flow == Flow::Continue {
            self.publish_idle()?;
        }
        Ok(flow)
    }

    fn execute(&mut self, cmd: Command) -> MoveOutcome {
        info!(command = cmd.name(), "Executing command");
        let o = &mut self.orchestrator;
        match cmd {
            Command::Store { x, z } => o.store_box(x, z),
            Command::Destore { x, z } => o.destore_box(x, z),
            Command::Rearrange { x, z, x_new, z_new } => o.rearrange_box(x, z, x_new, z_new),
            Command::StoreRandom => o.store_box_random(),
            Command::DestoreRandom => o.destore_box_random(),
            Command::InitX => o.init_x(),
            Command::InitY => o.init_y(),
            Command::InitZ => o.init_z(),
            Command::Release => o.release_in_transit(),
            Command::ShowOccupancy | Command::Shutdown => Ok(()),
        }
    }

    /// De-energize every output and publish `status SYS_EXIT`.
    pub fn finish(&mut self) -> io::Result<()> {
        self.orchestrator.carriage_mut().stop_motion();
        self.publish_status(Indicator::Exit)
    }
}

/// Publish a startup failure: the result code, ERROR, then SYS_EXIT.
pub fn publish_abort<W: Write>(out: &mut W, code: &str) -> io::Result<()> {
    writeln!(out, "result {code}")?;
    writeln!(out, "status {}", Indicator::Error)?;
    writeln!(out, "status {}", Indicator::Exit)?;
    out.flush()
}
