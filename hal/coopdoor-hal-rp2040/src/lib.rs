//! RP2040-specific HAL for the coop door controller
//!
//! This crate provides RP2040 implementations of the shared
//! `coopdoor-hal` traits:
//!
//! - Flash-backed settings store (implements `coopdoor_hal::KeyValueStore`)
//!
//! GPIO, blocking I2C and delays are used straight from `embassy-rp`
//! and `embassy-time`, which already implement `embedded-hal` 1.0.

#![no_std]

pub mod flash;

// Re-export shared traits from coopdoor-hal for convenience
pub use coopdoor_hal::{KeyValueStore, StorageKey};
