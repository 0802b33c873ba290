//! Coopdoor Hardware Abstraction Layer
//!
//! This crate defines the persistence abstraction shared by the
//! board-agnostic core and the chip-specific HALs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  coopdoor-core (settings, door, menu)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  coopdoor-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ coopdoor-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! Digital I/O, I2C and delays come from `embedded-hal` 1.0 directly.

#![no_std]
#![deny(unsafe_code)]

pub mod storage;

pub use storage::{KeyValueStore, StorageError, StorageKey};
