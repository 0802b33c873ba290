//! Door actuator trait
//!
//! Abstracts over the motor that moves the door (a geared stepper on a
//! ULN2003 board behind a power relay in the reference build).

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise rotation (positive step counts)
    Clockwise,
    /// Counter-clockwise rotation (negative step counts)
    CounterClockwise,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// Sign applied to a step count moving in this direction
    pub fn signum(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Trait for the door actuator
///
/// `step` blocks for the whole motion. There is no position feedback
/// here; the door controller pairs the actuator with a limit switch.
pub trait Actuator {
    /// Energise or release the motor driver
    ///
    /// When disabled the motor draws no current and does not hold position.
    fn enable(&mut self, enabled: bool);

    /// Check if the motor driver is energised
    fn is_enabled(&self) -> bool;

    /// Move by `steps`; the sign selects the direction
    fn step(&mut self, steps: i32);
}
