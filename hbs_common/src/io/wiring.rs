//! Fixed wiring table of the rack.
//!
//! Maps every actuator and sensor to a `(port, pin)` pair on the I/O
//! backplane and decodes sensor ladders into axis positions.
//!
//! # Outputs
//!
//! | Bit | Port/Pin | Actuator                    |
//! |-----|----------|-----------------------------|
//! | 0   | 0/0      | X towards 10                |
//! | 1   | 0/1      | X towards 1                 |
//! | 2   | 0/2      | X slow                      |
//! | 3   | 0/3      | Y towards INSERT            |
//! | 4   | 0/4      | Y towards RETRACT           |
//! | 5   | 0/5      | Z up                        |
//! | 6   | 0/6      | Z down                      |
//! | 7   | 0/7      | Station 1 release           |
//! | 8   | 1/0      | Station 1 intake            |
//! | 9   | 1/1      | Station 2 release           |
//! | 10  | 1/2      | Station 2 intake            |
//!
//! # Inputs
//!
//! | Sensor        | Port/Pin            |
//! |---------------|---------------------|
//! | X1..X8        | 0/0 .. 0/7          |
//! | X9, X10       | 1/0, 1/1            |
//! | Y RETRACT..INSERT | 1/2 .. 1/4      |
//! | Z10, Z9, Z8   | 1/5, 1/6, 1/7       |
//! | Z7..Z1        | 2/0 .. 2/6          |
//! | Input barrier | 3/1 (set = no box)  |
//! | E-stop        | 3/7                 |

use bitflags::bitflags;

use super::port::DigitalIo;
use crate::consts::{INPUT_PORTS, PINS_PER_PORT, X_COLUMNS, Z_POSITIONS};
use crate::types::YPosition;

bitflags! {
    /// Actuator outputs, one bit per pin in wiring order.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Outputs: u16 {
        /// X motor towards column 10.
        const X_UP          = 1 << 0;
        /// X motor towards column 1.
        const X_DOWN        = 1 << 1;
        /// X reduced speed.
        const X_SLOW        = 1 << 2;
        /// Y motor towards INSERT.
        const Y_INSERT      = 1 << 3;
        /// Y motor towards RETRACT.
        const Y_RETRACT     = 1 << 4;
        /// Z motor up.
        const Z_UP          = 1 << 5;
        /// Z motor down.
        const Z_DOWN        = 1 << 6;
        /// Conveyor station 1, release direction.
        const STATION1_OUT  = 1 << 7;
        /// Conveyor station 1, intake direction.
        const STATION1_IN   = 1 << 8;
        /// Conveyor station 2, release direction.
        const STATION2_OUT  = 1 << 9;
        /// Conveyor station 2, intake direction.
        const STATION2_IN   = 1 << 10;
    }
}

impl Outputs {
    /// All X actuators.
    pub const X_MOTION: Self = Self::X_UP.union(Self::X_DOWN).union(Self::X_SLOW);
    /// All Y actuators.
    pub const Y_MOTION: Self = Self::Y_INSERT.union(Self::Y_RETRACT);
    /// All Z actuators.
    pub const Z_MOTION: Self = Self::Z_UP.union(Self::Z_DOWN);
    /// Belts delivering a box to the input dock.
    pub const INPUT_CONVEYOR: Self = Self::STATION1_IN.union(Self::STATION2_IN);
    /// Belts carrying a box away from the output dock.
    pub const OUTPUT_CONVEYOR: Self = Self::STATION1_OUT.union(Self::STATION2_OUT);
    /// Everything that moves.
    pub const ALL_MOTION: Self = Self::X_MOTION
        .union(Self::Y_MOTION)
        .union(Self::Z_MOTION)
        .union(Self::INPUT_CONVEYOR)
        .union(Self::OUTPUT_CONVEYOR);

    /// `(port, pin)` of every set bit, in bit order.
    pub fn addresses(self) -> impl Iterator<Item = (u8, u8)> {
        let bits = self.bits();
        (0..16u8)
            .filter(move |bit| bits & (1 << bit) != 0)
            .map(|bit| (bit / PINS_PER_PORT, bit % PINS_PER_PORT))
    }

    /// Output flag at `(port, pin)`, empty if unwired.
    pub fn from_address(port: u8, pin: u8) -> Self {
        if pin >= PINS_PER_PORT || port > 1 {
            return Self::empty();
        }
        Self::from_bits_truncate(1u16 << (port * PINS_PER_PORT + pin))
    }
}

/// A single input sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    /// X column sensor `1..=10`.
    X(u8),
    /// Y depth sensor.
    Y(YPosition),
    /// Z sub-position sensor `1..=10`.
    Z(u8),
    /// Light barrier at the input dock; asserted while no box interrupts it.
    InputBarrier,
    /// Emergency-stop button.
    EmergencyStop,
}

impl Sensor {
    /// `(port, pin)` of the sensor, `None` for an index outside the ladder.
    pub const fn address(self) -> Option<(u8, u8)> {
        match self {
            Self::X(n @ 1..=8) => Some((0, n - 1)),
            Self::X(n @ 9..=10) => Some((1, n - 9)),
            Self::Y(y) => Some((1, 2 + y.rank())),
            Self::Z(n @ 1..=7) => Some((2, 7 - n)),
            Self::Z(n @ 8..=10) => Some((1, 15 - n)),
            Self::InputBarrier => Some((3, 1)),
            Self::EmergencyStop => Some((3, 7)),
            Self::X(_) | Self::Z(_) => None,
        }
    }
}

/// One sample of all input ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorFrame {
    ports: [u8; INPUT_PORTS as usize],
}

impl SensorFrame {
    /// Frame from raw port values.
    pub const fn from_ports(ports: [u8; INPUT_PORTS as usize]) -> Self {
        Self { ports }
    }

    /// Sample every input port once.
    pub fn read<I: DigitalIo + ?Sized>(io: &mut I) -> Self {
        let mut ports = [0u8; INPUT_PORTS as usize];
        for (idx, port) in ports.iter_mut().enumerate() {
            *port = io.read_port(idx as u8);
        }
        Self { ports }
    }

    /// Raw port values.
    pub const fn ports(&self) -> [u8; INPUT_PORTS as usize] {
        self.ports
    }

    /// Whether `sensor` is asserted.
    pub fn is_set(&self, sensor: Sensor) -> bool {
        match sensor.address() {
            Some((port, pin)) => self
                .ports
                .get(port as usize)
                .is_some_and(|bits| bits & (1 << pin) != 0),
            None => false,
        }
    }

    /// Lowest asserted X sensor.
    pub fn x(&self) -> Option<u8> {
        (1..=X_COLUMNS).find(|&n| self.is_set(Sensor::X(n)))
    }

    /// First asserted Y sensor in rank order.
    pub fn y(&self) -> Option<YPosition> {
        YPosition::ALL.into_iter().find(|&y| self.is_set(Sensor::Y(y)))
    }

    /// Lowest asserted Z sensor.
    pub fn z(&self) -> Option<u8> {
        (1..=Z_POSITIONS).find(|&n| self.is_set(Sensor::Z(n)))
    }

    /// Emergency-stop button pressed.
    pub fn emergency_stop(&self) -> bool {
        self.is_set(Sensor::EmergencyStop)
    }

    /// A box interrupts the input-dock light barrier.
    pub fn box_at_input(&self) -> bool {
        !self.is_set(Sensor::InputBarrier)
    }
}
