//! Configuration types
//!
//! Compile-time limits for the door and menu, plus the user settings
//! persisted as postcard values in the key-value store.

pub mod settings;
pub mod types;

pub use settings::{load_value, save, Settings, SettingsError};
pub use types::*;
