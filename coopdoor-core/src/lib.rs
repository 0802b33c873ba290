//! Board-agnostic core logic for the coop door controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (actuator, time source, character display)
//! - Event queue and listener registry (poll/dispatch split)
//! - Sunrise/sunset clock and day/night edge detection
//! - Door actuation protocol and calibration
//! - Two-button menu state machine
//! - Persisted settings
//! - The single cooperative control loop tying it together

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod controller;
pub mod door;
pub mod event;
pub mod menu;
pub mod sun;
pub mod traits;

#[cfg(any(test, feature = "testing-support"))]
pub mod testing;

pub use controller::{Controller, Devices, Platform};
