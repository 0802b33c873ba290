//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in coopdoor-core for the reference build:
//!
//! - Stepper driver (ULN2003 darlington array behind a supply relay)
//! - Real-time clock (DS3231 over I2C)
//! - Character display (HD44780 behind a PCF8574 I2C backpack)
//! - Button gesture detection (short, double and long presses)

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod input;
pub mod rtc;
pub mod stepper;
