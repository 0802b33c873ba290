//! Door actuation
//!
//! The door is raised by driving the actuator until a single limit switch
//! trips, and lowered open-loop by a calibrated step count. There is no
//! other position feedback.

pub mod controller;

pub use controller::{Door, DoorError, DoorState, Motion, Travel};
